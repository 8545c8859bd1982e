/// Primary language subtag of a locale code, lowercased (`pt_BR` -> `pt`).
pub fn primary_subtag(code: &str) -> String {
    code.trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

fn normalized(code: &str) -> String {
    code.trim().replace('_', "-").to_ascii_lowercase()
}

/// Maps a detector language code onto one of the configured locales.
///
/// An exact match (ignoring case and `_`/`-`) wins; otherwise the first locale
/// sharing the primary subtag is returned, so `pt` resolves to `pt_BR`.
pub fn match_locale<'a>(code: &str, locales: &'a [String]) -> Option<&'a str> {
    let wanted = normalized(code);
    if wanted.is_empty() {
        return None;
    }

    if let Some(exact) = locales.iter().find(|l| normalized(l) == wanted) {
        return Some(exact.as_str());
    }

    let primary = primary_subtag(code);
    locales
        .iter()
        .find(|l| primary_subtag(l) == primary)
        .map(String::as_str)
}

/// Language tag as the translation services expect it (`pt_BR` -> `pt-BR`).
pub fn service_code(locale: &str) -> String {
    locale.trim().replace('_', "-")
}
