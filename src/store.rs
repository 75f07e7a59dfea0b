use crate::types::{Appointment, AppointmentId};
use tokio::sync::watch::{self, Sender};
use tokio_stream::wrappers::WatchStream;
use tracing::debug;

/// Appointments of a single dashboard, newest first.
///
/// The sequence is only ever swapped as a whole through [`replace_all`], and
/// every swap is published to subscribers as one snapshot.
///
/// [`replace_all`]: AppointmentStore::replace_all
#[derive(Debug, Clone)]
pub struct AppointmentStore {
    sender: Sender<Vec<Appointment>>,
}

impl Default for AppointmentStore {
    fn default() -> Self {
        let (sender, _) = watch::channel(vec![]);
        Self { sender }
    }
}

impl AppointmentStore {
    pub fn initialize(&self, seed: Vec<Appointment>) {
        debug!(count = seed.len(), "Initialize appointment store");
        self.replace_all(seed);
    }

    pub fn replace_all(&self, appointments: Vec<Appointment>) {
        // send_replace also stores the value when nobody is subscribed
        self.sender.send_replace(appointments);
    }

    pub fn appointments(&self) -> Vec<Appointment> {
        self.sender.borrow().clone()
    }

    pub fn snapshot_stream(&self) -> WatchStream<Vec<Appointment>> {
        WatchStream::new(self.sender.subscribe())
    }

    pub fn contains(&self, id: AppointmentId) -> bool {
        self.sender.borrow().iter().any(|appointment| appointment.id == id)
    }

    pub fn len(&self) -> usize {
        self.sender.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sender.borrow().is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        testutils::{appointment, read_from_appointment_stream},
        types::AppointmentStatus,
    };

    #[test]
    fn test_initialize_and_read() {
        let store = AppointmentStore::default();
        assert!(store.is_empty());

        store.initialize(vec![
            appointment(1, AppointmentStatus::Pending),
            appointment(2, AppointmentStatus::Confirmed),
        ]);

        let appointments = store.appointments();
        assert_eq!(store.len(), 2);
        assert_eq!(appointments[0].id, AppointmentId(1));
        assert_eq!(appointments[1].id, AppointmentId(2));
        assert!(store.contains(AppointmentId(2)));
        assert!(!store.contains(AppointmentId(3)));
    }

    #[test]
    fn test_replace_all_swaps_whole_sequence() {
        let store = AppointmentStore::default();
        store.initialize(vec![appointment(1, AppointmentStatus::Pending)]);

        store.replace_all(vec![
            appointment(3, AppointmentStatus::Pending),
            appointment(2, AppointmentStatus::Cancelled),
        ]);

        let ids: Vec<AppointmentId> = store.appointments().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![AppointmentId(3), AppointmentId(2)]);
    }

    #[tokio::test]
    async fn test_snapshot_stream_yields_every_replacement() {
        let store = AppointmentStore::default();
        store.initialize(vec![appointment(1, AppointmentStatus::Pending)]);
        let mut stream = store.snapshot_stream();

        let snapshot = read_from_appointment_stream(&mut stream).await;
        assert_eq!(snapshot.len(), 1);

        store.replace_all(vec![
            appointment(2, AppointmentStatus::Pending),
            appointment(1, AppointmentStatus::Pending),
        ]);
        let snapshot = read_from_appointment_stream(&mut stream).await;
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].id, AppointmentId(2));
    }
}
