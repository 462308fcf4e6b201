//! Turns an untyped submission payload into a [`ListingCandidate`].
//!
//! Nothing here fails: whatever the payload looks like, the worst outcome is a candidate the
//! validator rejects.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

pub const NAME_MAX: usize = 120;
pub const CITY_MAX: usize = 80;
pub const CATEGORY_MAX: usize = 80;
pub const SERVICE_MAX: usize = 160;
pub const DESCRIPTION_MAX: usize = 1200;
pub const EMAIL_MAX: usize = 160;
pub const WEBSITE_MAX: usize = 200;
pub const WHATSAPP_MAX_DIGITS: usize = 20;
pub const REGION_LEN: usize = 2;

const NAME_KEYS: &[&str] = &["name", "nome", "empresa"];
const REGION_KEYS: &[&str] = &["uf"];
const CITY_KEYS: &[&str] = &["city", "cidade"];
const CATEGORY_KEYS: &[&str] = &["category", "categoria"];
const SERVICE_KEYS: &[&str] = &["service", "servico"];
const DESCRIPTION_KEYS: &[&str] = &["description", "descricao"];
const WHATSAPP_KEYS: &[&str] = &["whatsapp"];
const EMAIL_KEYS: &[&str] = &["email"];
const WEBSITE_KEYS: &[&str] = &["website", "site"];

/// Raw key/value payload as decoded from a JSON object or a form body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSubmission {
    fields: BTreeMap<String, String>,
}

impl RawSubmission {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a payload from a JSON document. Non-object documents yield an empty payload;
    /// `null`, arrays and nested objects are treated as absent.
    pub fn from_json(value: Value) -> Self {
        let Value::Object(map) = value else {
            return Self::default();
        };

        let fields = map
            .into_iter()
            .filter_map(|(key, value)| {
                let text = match value {
                    Value::String(text) => text,
                    Value::Number(number) => number.to_string(),
                    Value::Bool(flag) => flag.to_string(),
                    Value::Null | Value::Array(_) | Value::Object(_) => return None,
                };
                Some((key, text))
            })
            .collect();

        Self { fields }
    }

    /// Builds a payload from decoded form pairs. Repeated keys keep the first value.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut fields = BTreeMap::new();
        for (key, value) in pairs {
            fields.entry(key.into()).or_insert_with(|| value.into());
        }
        Self { fields }
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.fields.insert(key.to_string(), value.to_string());
        self
    }

    fn first(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|key| self.fields.get(*key))
            .map(String::as_str)
            .find(|value| !value.trim().is_empty())
            .or_else(|| keys.iter().find_map(|key| self.fields.get(*key)).map(String::as_str))
    }
}

/// Cleaned submission. `None` means the field was not sent at all; a blank field that was
/// sent is kept as `Some("")`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListingCandidate {
    pub name: Option<String>,
    pub uf: Option<String>,
    pub city: Option<String>,
    pub category: Option<String>,
    pub service: Option<String>,
    pub description: Option<String>,
    pub whatsapp: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
}

pub fn normalize(raw: &RawSubmission) -> ListingCandidate {
    ListingCandidate {
        name: raw.first(NAME_KEYS).map(|v| clean_text(v, NAME_MAX)),
        uf: raw.first(REGION_KEYS).map(normalize_region),
        city: raw.first(CITY_KEYS).map(|v| clean_text(v, CITY_MAX)),
        category: raw.first(CATEGORY_KEYS).map(|v| clean_text(v, CATEGORY_MAX)),
        service: raw.first(SERVICE_KEYS).map(|v| clean_text(v, SERVICE_MAX)),
        description: raw
            .first(DESCRIPTION_KEYS)
            .map(|v| clean_text(v, DESCRIPTION_MAX)),
        whatsapp: raw.first(WHATSAPP_KEYS).map(normalize_phone),
        email: raw.first(EMAIL_KEYS).map(normalize_email),
        website: raw.first(WEBSITE_KEYS).map(|v| clean_text(v, WEBSITE_MAX)),
    }
}

/// Trims, collapses inner whitespace runs to one space and caps the result at `max` chars.
pub fn clean_text(value: &str, max: usize) -> String {
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
    let capped: String = collapsed.chars().take(max).collect();
    capped.trim_end().to_string()
}

pub fn normalize_region(value: &str) -> String {
    clean_text(value, usize::MAX)
        .to_lowercase()
        .chars()
        .take(REGION_LEN)
        .collect()
}

pub fn normalize_phone(value: &str) -> String {
    value
        .chars()
        .filter(char::is_ascii_digit)
        .take(WHATSAPP_MAX_DIGITS)
        .collect()
}

pub fn normalize_email(value: &str) -> String {
    clean_text(value, EMAIL_MAX).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clean_text_collapses_whitespace_and_caps() {
        assert_eq!(clean_text("  Eco \t  Coleta\n Ltda ", 120), "Eco Coleta Ltda");
        assert_eq!(clean_text("abcdef", 3), "abc");
        assert_eq!(clean_text("ab cd", 3), "ab");
        assert_eq!(clean_text("ção", 2), "çã");
    }

    #[test]
    fn region_is_lowercased_and_truncated() {
        assert_eq!(normalize_region(" SP "), "sp");
        assert_eq!(normalize_region("Minas"), "mi");
        assert_eq!(normalize_region(""), "");
    }

    #[test]
    fn region_normalization_is_idempotent() {
        for code in ["sp", "rj", "mg", "ba"] {
            assert_eq!(normalize_region(code), code);
            assert_eq!(normalize_region(&normalize_region(code)), code);
        }
    }

    #[test]
    fn phone_keeps_digits_only() {
        assert_eq!(normalize_phone("+55 (11) 98765-4321"), "5511987654321");
        assert_eq!(normalize_phone("abc"), "");
        assert_eq!(normalize_phone(&"9".repeat(30)).len(), WHATSAPP_MAX_DIGITS);
    }

    #[test]
    fn aliases_are_resolved() {
        let raw = RawSubmission::from_pairs([
            ("empresa", "Recicla Já"),
            ("cidade", "Campinas"),
            ("categoria", "Sucata"),
            ("servico", "Coleta"),
            ("descricao", "Coleta   seletiva"),
            ("site", "https://recicla.example"),
            ("uf", "SP"),
        ]);
        let candidate = normalize(&raw);
        assert_eq!(candidate.name.as_deref(), Some("Recicla Já"));
        assert_eq!(candidate.city.as_deref(), Some("Campinas"));
        assert_eq!(candidate.category.as_deref(), Some("Sucata"));
        assert_eq!(candidate.service.as_deref(), Some("Coleta"));
        assert_eq!(candidate.description.as_deref(), Some("Coleta seletiva"));
        assert_eq!(candidate.website.as_deref(), Some("https://recicla.example"));
        assert_eq!(candidate.uf.as_deref(), Some("sp"));
    }

    #[test]
    fn primary_key_wins_over_alias() {
        let raw = RawSubmission::from_pairs([("name", "Primary"), ("nome", "Alias")]);
        assert_eq!(normalize(&raw).name.as_deref(), Some("Primary"));

        let raw = RawSubmission::from_pairs([("name", "  "), ("nome", "Alias")]);
        assert_eq!(normalize(&raw).name.as_deref(), Some("Alias"));
    }

    #[test]
    fn absent_and_blank_fields_are_distinguished() {
        let raw = RawSubmission::from_pairs([("email", "   ")]);
        let candidate = normalize(&raw);
        assert_eq!(candidate.email.as_deref(), Some(""));
        assert_eq!(candidate.website, None);
    }

    #[test]
    fn json_scalars_are_read_as_text() {
        let raw = RawSubmission::from_json(json!({
            "name": "EcoColeta",
            "whatsapp": 11987654321u64,
            "email": "  Contato@EcoColeta.COM ",
            "website": null,
            "category": ["nested"],
        }));
        let candidate = normalize(&raw);
        assert_eq!(candidate.whatsapp.as_deref(), Some("11987654321"));
        assert_eq!(candidate.email.as_deref(), Some("contato@ecocoleta.com"));
        assert_eq!(candidate.website, None);
        assert_eq!(candidate.category, None);
    }

    #[test]
    fn non_object_json_yields_empty_candidate() {
        let candidate = normalize(&RawSubmission::from_json(json!(["EcoColeta"])));
        assert_eq!(candidate, ListingCandidate::default());
    }
}
