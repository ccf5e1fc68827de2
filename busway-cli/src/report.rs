//! Fixed-width user listing

use busway_core::User;

const RULE_WIDTH: usize = 90;

/// Render the user table. Column widths are minimums; longer values are
/// printed in full.
pub fn user_table(users: &[User]) -> Vec<String> {
    let mut lines = Vec::with_capacity(users.len() + 4);
    lines.push(String::new());
    lines.push("=== USERS ===".to_string());
    lines.push(format!(
        "{:<5} {:<20} {:<25} {:<15} {:<15} {:<3}",
        "ID", "Name", "Email", "National ID", "City", "UF"
    ));
    lines.push("-".repeat(RULE_WIDTH));

    for user in users {
        lines.push(format!(
            "{:<5} {:<20} {:<25} {:<15} {:<15} {:<3}",
            user.id, user.name, user.email, user.national_id, user.city, user.region
        ));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use busway_core::NewUser;

    fn user(id: i32, name: &str) -> User {
        NewUser::new(name, "ana@x.com", "secret", "111", "Recife", "PE")
            .unwrap()
            .into_user(id)
    }

    #[test]
    fn rows_are_aligned_under_the_header() {
        let lines = user_table(&[user(1, "Ana"), user(12, "Bia")]);

        assert_eq!(lines[1], "=== USERS ===");
        assert_eq!(lines[3], "-".repeat(90));
        assert_eq!(
            lines[4],
            "1     Ana                  ana@x.com                 111             Recife          PE "
        );
        assert!(lines[5].starts_with("12    Bia "));

        let email_col = lines[2].find("Email").unwrap();
        assert_eq!(lines[4].find("ana@x.com"), Some(email_col));
    }

    #[test]
    fn password_is_never_listed() {
        let lines = user_table(&[user(1, "Ana")]);
        assert!(lines.iter().all(|line| !line.contains("secret")));
    }

    #[test]
    fn long_values_are_not_truncated() {
        let name = "Maria da Conceição Albuquerque";
        let lines = user_table(&[user(3, name)]);
        assert!(lines[4].contains(name));
    }
}
