//! Defines [`normalize`], which derives the canonical identifier for a city
//! record from its name and region. The identifier doubles as the progress
//! tracker key and the output file stem, so it must be stable across process
//! runs and across machines: no locale-dependent case mapping, no hashing.

/// Derives the canonical identifier for a `(name, region)` pair.
///
/// Each field is trimmed, characters other than alphanumerics and the
/// separators space/hyphen/underscore are dropped, and runs of separators
/// collapse to a single underscore. The cleaned fields are joined with a
/// hyphen, so `("Winston Salem", "NC")` and `("Winston-Salem", "NC")` both
/// yield `Winston_Salem-NC` while `("Reno", "NV")` and `("Reno", "CA")`
/// stay distinct.
pub fn normalize(name: &str, region: &str) -> String {
    format!("{}-{}", clean(name), clean(region))
}

fn clean(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut pending_separator = false;
    for c in field.trim().chars() {
        if c.is_alphanumeric() {
            if pending_separator && !out.is_empty() {
                out.push('_');
            }
            pending_separator = false;
            out.push(c);
        } else if c == ' ' || c == '-' || c == '_' {
            pending_separator = true;
        }
        // anything else is dropped without acting as a separator
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_plain_pair() {
        assert_eq!("Reno-NV", normalize("Reno", "NV"));
    }

    #[test]
    fn test_separator_variants_coincide() {
        assert_eq!(
            normalize("Winston-Salem", "NC"),
            normalize("Winston Salem", "NC"),
        );
        assert_eq!("Winston_Salem-NC", normalize("Winston-Salem", "NC"));
    }

    #[test]
    fn test_regions_stay_distinct() {
        assert_ne!(normalize("Reno", "NV"), normalize("Reno", "CA"));
    }

    #[test]
    fn test_punctuation_dropped() {
        assert_eq!("St_Louis-MO", normalize("St. Louis", "MO"));
        assert_eq!("OFallon-IL", normalize("O'Fallon", "IL"));
    }

    #[test]
    fn test_surrounding_noise_trimmed() {
        assert_eq!("Reno-NV", normalize("  Reno  ", " NV "));
        assert_eq!("Reno-NV", normalize("-Reno-", "NV"));
    }

    #[test]
    fn test_separator_runs_collapse() {
        assert_eq!("Coeur_dAlene-ID", normalize("Coeur  d'Alene", "ID"));
        assert_eq!("A_B-C", normalize("A -_ B", "C"));
    }
}
