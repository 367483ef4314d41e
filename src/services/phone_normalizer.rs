//! services/phone_normalizer.rs
//! Normalización de teléfonos antes de enviarlos a un proveedor.

use regex::Regex;
use std::sync::LazyLock;

static NON_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^0-9]+").unwrap());
static TRUNK_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^8(\d{10})$").unwrap());

/// Deja solo dígitos y reescribe el prefijo troncal `8XXXXXXXXXX` a `7XXXXXXXXXX`.
///
/// Nunca falla: si no queda ningún dígito se devuelve la entrada tal cual
/// y será el proveedor quien la rechace.
pub fn normalize(raw: &str) -> String {
    let digits = NON_DIGITS.replace_all(raw, "");
    if digits.is_empty() {
        return raw.to_string();
    }
    TRUNK_PREFIX.replace(&digits, "7$1").into_owned()
}
