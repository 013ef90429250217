use server::auth::password::hash_password;

/// Print an argon2 hash for seeding accounts by hand.
fn main() -> Result<(), shared_types::AppError> {
    let password = std::env::args().nth(1).unwrap_or_else(|| "changeme123".to_string());
    println!("{}", hash_password(&password)?);
    Ok(())
}
