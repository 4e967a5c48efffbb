//! Address book of WhatsApp share destinations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

const WHATSAPP_WEB: &str = "https://web.whatsapp.com/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Creation time in Unix milliseconds, unique within the book
    pub id: i64,
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContactError {
    #[error("contact name is empty")]
    EmptyName,
    #[error("phone number is empty")]
    EmptyPhone,
}

/// Strip spaces, dashes and parentheses, and make sure the number starts
/// with `+`.
pub fn normalize_phone(phone: &str) -> String {
    let cleaned: String = phone
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
        .collect();

    if cleaned.starts_with('+') {
        cleaned
    } else {
        format!("+{}", cleaned)
    }
}

/// WhatsApp Web deep link for a phone number, or the web client root
pub fn whatsapp_link(phone: Option<&str>) -> String {
    match phone {
        Some(phone) => {
            let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
            format!("{}send?phone={}", WHATSAPP_WEB, digits)
        }
        None => WHATSAPP_WEB.to_string(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactBook {
    contacts: Vec<Contact>,
}

impl ContactBook {
    pub fn new(contacts: Vec<Contact>) -> Self {
        Self { contacts }
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Contact> {
        self.contacts.get(index)
    }

    /// Add a contact stamped with the current time
    pub fn add(&mut self, name: &str, phone: &str) -> Result<&Contact, ContactError> {
        self.add_at(name, phone, chrono::Utc::now().timestamp_millis())
    }

    /// Add a contact with an explicit creation timestamp. The id is bumped
    /// past any existing id it would collide with.
    pub fn add_at(&mut self, name: &str, phone: &str, now_ms: i64) -> Result<&Contact, ContactError> {
        let name = name.trim();
        let phone = phone.trim();
        if name.is_empty() {
            return Err(ContactError::EmptyName);
        }
        if phone.is_empty() {
            return Err(ContactError::EmptyPhone);
        }

        let mut id = now_ms;
        while self.contacts.iter().any(|c| c.id == id) {
            id += 1;
        }

        self.contacts.push(Contact {
            id,
            name: name.to_string(),
            phone: normalize_phone(phone),
        });
        tracing::info!(id, "Added contact {}", name);

        let index = self.contacts.len() - 1;
        Ok(&self.contacts[index])
    }

    /// Remove the contact with `id`; returns whether one was removed
    pub fn delete(&mut self, id: i64) -> bool {
        let before = self.contacts.len();
        self.contacts.retain(|c| c.id != id);
        before != self.contacts.len()
    }
}
