//! Message catalog

use super::traits::Localizer;
use std::collections::HashMap;

/// Built-in English strings used by the form session
const ENGLISH: &[(&str, &str)] = &[
    ("edit.save.success", "Changes saved"),
    ("edit.save.error", "Could not save changes"),
    ("edit.save.error.intro", "Please correct the errors in:"),
    ("edit.save.network.error", "Could not reach the server"),
    ("edit.save.problem", "A save is already in progress"),
    ("form", "form"),
    ("form.clear", "Form reset to the last saved values"),
    ("form.unsaved.alert", "You have unsaved changes. Leave anyway?"),
    ("education", "Education"),
    ("experience", "Experience"),
];

/// Key -> message lookup; unknown keys render as the key itself
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    messages: HashMap<String, String>,
}

impl Catalog {
    pub fn english() -> Self {
        Self {
            messages: ENGLISH
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Override or add messages (e.g. from a translation file)
    pub fn extend<I: IntoIterator<Item = (String, String)>>(&mut self, messages: I) {
        self.messages.extend(messages);
    }
}

impl Localizer for Catalog {
    fn localize(&self, key: &str) -> String {
        self.messages
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}
