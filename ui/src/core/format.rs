//! Formatting helpers for presenting measures and filter values.

use crate::data::model::SexCode;

/// `working_memory` -> `Working Memory`.
pub fn format_measure_name(id: &str) -> String {
    id.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Human label for a sex code: 0 and 1 are named, anything else passes through.
pub fn sex_label(code: &SexCode) -> String {
    match code {
        SexCode::Numeric(0) => "Female".to_string(),
        SexCode::Numeric(1) => "Male".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_names_are_title_cased() {
        assert_eq!(format_measure_name("working_memory"), "Working Memory");
        assert_eq!(format_measure_name("attention"), "Attention");
    }

    #[test]
    fn sex_codes_map_to_labels() {
        assert_eq!(sex_label(&SexCode::Numeric(0)), "Female");
        assert_eq!(sex_label(&SexCode::Numeric(1)), "Male");
        assert_eq!(sex_label(&SexCode::Numeric(2)), "2");
        assert_eq!(sex_label(&SexCode::Text("X".into())), "X");
    }
}
