use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::models::contact::ContactRequest;
use crate::models::ContactSubmission;
use crate::services::error::{require, PortalError};
use crate::services::portal_store::PortalStore;
use crate::storage::Update;

pub struct ContactService {
    store: Arc<PortalStore>,
}

impl ContactService {
    pub fn new(store: Arc<PortalStore>) -> Self {
        Self { store }
    }

    pub fn submit_contact(&self, req: ContactRequest) -> Result<ContactSubmission, PortalError> {
        require(&req.name, "name")?;
        require(&req.email, "email")?;
        require(&req.message, "message")?;

        // Checked as stored
        let req = ContactRequest {
            name: req.name.trim().to_string(),
            email: req.email.trim().to_string(),
            message: req.message,
        };
        req.validate()?;

        let submission = ContactSubmission {
            name: req.name,
            email: req.email,
            message: req.message,
            submitted_at: Utc::now(),
        };
        self.store.contact_submissions().modify(|all| {
            all.push(submission.clone());
            Update::Changed(())
        });

        tracing::info!("Contact message received from {}", submission.email);
        Ok(submission)
    }
}
