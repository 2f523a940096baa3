//! Produce a credential record for `CREDENTIALS_FILE`.
//!
//! ```text
//! echo -n 's3cret' | hash-password operator
//! {"username":"operator","password_hash":"$argon2id$v=19$..."}
//! ```
//!
//! The password is read from the first line of stdin so it never appears in
//! the process list or shell history. Collect the printed records into a JSON
//! array to build the credentials file.

use std::io::BufRead;

use chargeplan_api::auth::credentials::CredentialRecord;

fn main() {
    let username = std::env::args()
        .nth(1)
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| {
            eprintln!("usage: hash-password <username>  (password on stdin)");
            std::process::exit(2);
        });

    let mut password = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut password)
        .expect("Failed to read password from stdin");
    let password = password.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        eprintln!("password must not be empty");
        std::process::exit(2);
    }

    let record = CredentialRecord::hashed(username, password).expect("Failed to hash password");
    println!(
        "{}",
        serde_json::to_string(&record).expect("Failed to serialize credential record")
    );
}
