//! Generates an Argon2 PHC hash for `ADMIN_PASSWORD_HASH`.
//!
//! Usage: `hashpw <password>`

use salesboard::auth::hash_password;

fn main() {
    let password = match std::env::args().nth(1) {
        Some(p) => p,
        None => {
            eprintln!("usage: hashpw <password>");
            std::process::exit(2);
        }
    };

    match hash_password(&password) {
        Ok(hash) => println!("{}", hash),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}
