//! Author name parts parsed from the vendor bibliographic XML.

use serde::Serialize;

/// Display sentinel used where an absent name part must render as text
/// (sort keys and the validation report). Name parts stay `None` until then.
pub const NONE_SENTINEL: &str = "NONE";

/// Flat name record derived once per submission; immutable after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizedName {
    pub title: Option<String>,
    pub surname: Option<String>,
    pub given_name: Option<String>,
    pub middle_name: Option<String>,
}

impl NormalizedName {
    /// Surname coerced to the display sentinel; the batch sort key.
    pub fn surname_or_sentinel(&self) -> &str {
        self.surname.as_deref().unwrap_or(NONE_SENTINEL)
    }

    /// Title coerced to the display sentinel, for reporting.
    pub fn title_or_sentinel(&self) -> &str {
        self.title.as_deref().unwrap_or(NONE_SENTINEL)
    }

    /// Given name coerced to the display sentinel, for reporting.
    pub fn given_name_or_sentinel(&self) -> &str {
        self.given_name.as_deref().unwrap_or(NONE_SENTINEL)
    }

    /// Copyright-owner display name: title-cased given name, middle name,
    /// surname in that order. Absent parts and parts equal to the sentinel
    /// (case-insensitive) are excluded from the join.
    pub fn rights_holder(&self) -> String {
        [&self.given_name, &self.middle_name, &self.surname]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .map(str::trim)
            .filter(|part| !part.is_empty() && !part.eq_ignore_ascii_case(NONE_SENTINEL))
            .map(title_case)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Word-initial capitalization with non-alphabetic boundaries, so
/// "smith-jones" becomes "Smith-Jones" and "VAN DER BERG" becomes
/// "Van Der Berg".
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_alpha = false;
    for ch in value.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}
