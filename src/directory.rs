use crate::types::Doctor;

pub trait DoctorDirectory: Clone + Send + Sync + 'static {
    fn doctors(&self) -> Vec<Doctor>;

    fn find(&self, id: i64) -> Option<Doctor> {
        self.doctors().into_iter().find(|doctor| doctor.id == id)
    }

    /// Doctors that can be selected in the booking form, in directory order.
    fn bookable(&self) -> Vec<Doctor> {
        self.doctors()
            .into_iter()
            .filter(|doctor| doctor.available)
            .collect()
    }

    /// Case-insensitive match of `query` against name or specialty, optionally
    /// restricted to one specialty.
    fn search(&self, query: &str, specialty: Option<&str>) -> Vec<Doctor> {
        let query = query.to_lowercase();
        self.doctors()
            .into_iter()
            .filter(|doctor| {
                doctor.name.to_lowercase().contains(&query)
                    || doctor.specialty.to_lowercase().contains(&query)
            })
            .filter(|doctor| specialty.map_or(true, |specialty| doctor.specialty == specialty))
            .collect()
    }

    /// Distinct specialties in first-seen order.
    fn specialties(&self) -> Vec<String> {
        let mut specialties: Vec<String> = vec![];
        for doctor in self.doctors() {
            if !specialties.contains(&doctor.specialty) {
                specialties.push(doctor.specialty);
            }
        }
        specialties
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    doctors: Vec<Doctor>,
}

impl StaticDirectory {
    pub fn new(doctors: Vec<Doctor>) -> Self {
        Self { doctors }
    }
}

impl DoctorDirectory for StaticDirectory {
    fn doctors(&self) -> Vec<Doctor> {
        self.doctors.clone()
    }

    fn find(&self, id: i64) -> Option<Doctor> {
        self.doctors.iter().find(|doctor| doctor.id == id).cloned()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testutils::doctor;

    fn directory() -> StaticDirectory {
        StaticDirectory::new(vec![
            doctor(1, "Dr. Sarah Johnson", "Cardiology", true),
            doctor(2, "Dr. Michael Chen", "Neurology", false),
            doctor(3, "Dr. Emily Carter", "Cardiology", true),
            doctor(4, "Dr. James Wilson", "Dermatology", true),
        ])
    }

    #[test]
    fn test_find() {
        let directory = directory();
        assert_eq!(directory.find(2).unwrap().name, "Dr. Michael Chen");
        assert!(directory.find(42).is_none());
    }

    #[test]
    fn test_bookable_keeps_order_and_skips_unavailable() {
        let ids: Vec<i64> = directory().bookable().iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![1, 3, 4]);
    }

    #[test_case::test_case("", None, &[1, 2, 3, 4])]
    #[test_case::test_case("cardio", None, &[1, 3])]
    #[test_case::test_case("CHEN", None, &[2])]
    #[test_case::test_case("dr.", Some("Dermatology"), &[4])]
    #[test_case::test_case("emily", Some("Neurology"), &[])]
    fn test_search(query: &str, specialty: Option<&str>, expected: &[i64]) {
        let ids: Vec<i64> = directory()
            .search(query, specialty)
            .iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_specialties_first_seen_order() {
        assert_eq!(
            directory().specialties(),
            vec!["Cardiology", "Neurology", "Dermatology"]
        );
    }
}
