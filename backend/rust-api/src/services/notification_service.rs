use std::sync::Arc;

use crate::models::Notification;
use crate::services::error::PortalError;
use crate::services::portal_store::PortalStore;
use crate::storage::Update;

pub struct NotificationService {
    store: Arc<PortalStore>,
}

impl NotificationService {
    pub fn new(store: Arc<PortalStore>) -> Self {
        Self { store }
    }

    /// Newest first, as stored.
    pub fn list_for_user(&self, user_id: &str) -> Vec<Notification> {
        self.store.notifications().read(|all| {
            all.iter()
                .filter(|n| n.user_id == user_id)
                .cloned()
                .collect()
        })
    }

    pub fn unread_count(&self, user_id: &str) -> usize {
        self.store
            .notifications()
            .read(|all| all.iter().filter(|n| n.user_id == user_id && !n.is_read).count())
    }

    /// Only the recipient may mark a notification.
    pub fn mark_read(&self, user_id: &str, notification_id: &str) -> Result<(), PortalError> {
        let found = self.store.notifications().modify(|all| {
            match all
                .iter_mut()
                .find(|n| n.id == notification_id && n.user_id == user_id)
            {
                Some(n) if n.is_read => Update::Unchanged(true),
                Some(n) => {
                    n.is_read = true;
                    Update::Changed(true)
                }
                None => Update::Unchanged(false),
            }
        });
        if found {
            Ok(())
        } else {
            Err(PortalError::not_found("notification", notification_id))
        }
    }

    /// Returns how many notifications changed.
    pub fn mark_all_read(&self, user_id: &str) -> usize {
        self.store.notifications().modify(|all| {
            let mut changed = 0;
            for n in all.iter_mut().filter(|n| n.user_id == user_id && !n.is_read) {
                n.is_read = true;
                changed += 1;
            }
            if changed > 0 {
                Update::Changed(changed)
            } else {
                Update::Unchanged(0)
            }
        })
    }

    pub fn delete(&self, user_id: &str, notification_id: &str) -> Result<(), PortalError> {
        let removed = self.store.notifications().modify(|all| {
            let before = all.len();
            all.retain(|n| !(n.id == notification_id && n.user_id == user_id));
            if all.len() == before {
                Update::Unchanged(false)
            } else {
                Update::Changed(true)
            }
        });
        if removed {
            Ok(())
        } else {
            Err(PortalError::not_found("notification", notification_id))
        }
    }

    /// Returns how many notifications were removed.
    pub fn clear_for_user(&self, user_id: &str) -> usize {
        self.store.notifications().modify(|all| {
            let before = all.len();
            all.retain(|n| n.user_id != user_id);
            let removed = before - all.len();
            if removed > 0 {
                Update::Changed(removed)
            } else {
                Update::Unchanged(0)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewNotification, NotificationKind};
    use crate::storage::MemoryStorage;

    fn notify(store: &PortalStore, user_id: &str, message: &str) -> Notification {
        store.add_notification(NewNotification {
            user_id: user_id.to_string(),
            kind: NotificationKind::Other("info".to_string()),
            message: message.to_string(),
            link: None,
        })
    }

    fn service() -> (Arc<PortalStore>, NotificationService) {
        let store = Arc::new(PortalStore::open(Arc::new(MemoryStorage::new())));
        (store.clone(), NotificationService::new(store))
    }

    #[test]
    fn test_unread_and_mark_read() {
        let (store, service) = service();
        let first = notify(&store, "user-1", "a");
        notify(&store, "user-1", "b");
        notify(&store, "user-2", "c");

        assert_eq!(service.unread_count("user-1"), 2);
        service.mark_read("user-1", &first.id).unwrap();
        assert_eq!(service.unread_count("user-1"), 1);

        // Another user's notification is invisible to user-2
        assert!(service.mark_read("user-2", &first.id).is_err());

        assert_eq!(service.mark_all_read("user-1"), 1);
        assert_eq!(service.mark_all_read("user-1"), 0);
        assert_eq!(service.unread_count("user-2"), 1);
    }

    #[test]
    fn test_list_is_newest_first() {
        let (store, service) = service();
        notify(&store, "user-1", "older");
        notify(&store, "user-1", "newer");

        let messages: Vec<_> = service
            .list_for_user("user-1")
            .into_iter()
            .map(|n| n.message)
            .collect();
        assert_eq!(messages, vec!["newer", "older"]);
    }

    #[test]
    fn test_delete_and_clear() {
        let (store, service) = service();
        let first = notify(&store, "user-1", "a");
        notify(&store, "user-1", "b");
        notify(&store, "user-2", "c");

        service.delete("user-1", &first.id).unwrap();
        assert!(service.delete("user-1", &first.id).is_err());
        assert_eq!(service.clear_for_user("user-1"), 1);
        assert!(service.list_for_user("user-1").is_empty());
        assert_eq!(service.list_for_user("user-2").len(), 1);
    }
}
