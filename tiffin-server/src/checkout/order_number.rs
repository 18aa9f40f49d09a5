//! Human-readable order numbers
//!
//! Date prefix + random suffix, e.g. `TF-20260805-K3QX7N`. The suffix alone
//! is not collision-proof; uniqueness is enforced by the database
//! constraint, with the factory regenerating on conflict.

use rand::Rng;
use rand::distributions::Alphanumeric;

pub fn generate() -> String {
    let date = chrono::Utc::now().format("%Y%m%d");
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|b| (b as char).to_ascii_uppercase())
        .collect();
    format!("TF-{date}-{suffix}")
}
