use crate::common::error::AppError;

/// Lowercases and transliterates Turkish letters, collapsing everything that
/// is not `[a-z0-9]` into single dashes.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for ch in input.chars() {
        let mapped = match ch {
            'ç' | 'Ç' => 'c',
            'ğ' | 'Ğ' => 'g',
            'ı' | 'I' | 'İ' => 'i',
            'ö' | 'Ö' => 'o',
            'ş' | 'Ş' => 's',
            'ü' | 'Ü' => 'u',
            c => c.to_ascii_lowercase(),
        };

        if mapped.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(mapped);
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// `slugify` that refuses to return an empty slug.
pub fn slug_for(source: &str) -> Result<String, AppError> {
    let slug = slugify(source);
    if slug.is_empty() {
        return Err(AppError::validation(format!(
            "'{}' değerinden geçerli bir slug üretilemedi",
            source.trim()
        )));
    }
    Ok(slug)
}

/// Caller-supplied slug if non-blank, otherwise derived from the name.
pub fn resolve_slug(explicit: Option<&str>, name: &str) -> Result<String, AppError> {
    match explicit.map(str::trim).filter(|s| !s.is_empty()) {
        Some(slug) => slug_for(slug),
        None => slug_for(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transliterates_turkish() {
        assert_eq!(slugify("Ana Kategori"), "ana-kategori");
        assert_eq!(slugify("Çocuk Giyim & Ayakkabı"), "cocuk-giyim-ayakkabi");
        assert_eq!(slugify("İŞLEMCİ Soğutucu"), "islemci-sogutucu");
    }

    #[test]
    fn trims_separators() {
        assert_eq!(slugify("  --Elektronik--  "), "elektronik");
        assert_eq!(slugify("USB-C  3.1"), "usb-c-3-1");
    }

    #[test]
    fn slug_comes_from_name_unless_given() {
        assert_eq!(resolve_slug(None, "Kablosuz Kulaklık").unwrap(), "kablosuz-kulaklik");
        assert_eq!(resolve_slug(Some("  "), "Çay Bardağı").unwrap(), "cay-bardagi");
        assert_eq!(resolve_slug(Some("Özel Ürün"), "ignored").unwrap(), "ozel-urun");
    }

    #[test]
    fn names_without_letters_or_digits_are_rejected() {
        assert_eq!(slugify("★★★"), "");
        assert!(matches!(slug_for("★★★"), Err(AppError::Validation(_))));
        assert!(matches!(resolve_slug(Some("!!!"), "Kulaklık"), Err(AppError::Validation(_))));
        assert!(resolve_slug(None, "★ Yıldız ★").is_ok());
    }
}
