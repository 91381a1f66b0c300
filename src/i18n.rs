// ==========================================
// App Granja - i18n
// ==========================================
// rust-i18n; Spanish (default) and English.
// The rust_i18n::i18n! macro is initialised in lib.rs
// ==========================================

/// Locale used when none is requested
pub const DEFAULT_LOCALE: &str = "es";

pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// Switch locale ("es" or "en")
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// Translate a key without arguments
///
/// # Example
/// ```no_run
/// use app_granja::i18n::t;
/// let msg = t("recomendacion.alimento_no_especificado");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// Translate a key and replace its `%{name}` placeholders
///
/// # Example
/// ```no_run
/// use app_granja::i18n::t_with_args;
/// let msg = t_with_args("importar.archivo_no_encontrado", &[("path", "/tmp/datos.csv")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

/// Serialises tests that touch the global locale
#[cfg(test)]
pub(crate) static LOCALE_TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_locale() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        set_locale("en");
        assert_eq!(current_locale(), "en");
        set_locale("es");
        assert_eq!(current_locale(), "es");
    }

    #[test]
    fn test_translate_with_args() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        set_locale("es");
        let msg = t_with_args("recomendacion.datos_insuficientes", &[("min", "3")]);
        assert!(msg.contains("mínimo 3 registros"));

        set_locale("en");
        let msg = t_with_args("recomendacion.datos_insuficientes", &[("min", "3")]);
        assert!(msg.contains("minimum 3 records"));

        set_locale("es");
    }
}
