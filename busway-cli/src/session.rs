//! Interactive menu session
//!
//! A `Session` owns the store handle and the console for one run of the
//! menu. The loop only leaves `Running` through a confirmed exit, an
//! interrupt, or exhausted input; any error from a single iteration is
//! reported and the loop carries on.

use anyhow::Result;
use busway_core::{NewUser, StoreError, UserId, UserStore, UserUpdate};
use tracing::{debug, error, warn};

use crate::console::{Console, InputError};
use crate::report;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Running,
    Exiting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuOption {
    Create,
    List,
    Edit,
    Remove,
    Exit,
}

impl MenuOption {
    fn parse(code: &str) -> Option<Self> {
        match code {
            "1" => Some(Self::Create),
            "2" => Some(Self::List),
            "3" => Some(Self::Edit),
            "4" => Some(Self::Remove),
            "0" => Some(Self::Exit),
            _ => None,
        }
    }
}

const MENU: &[&str] = &[
    "USERS:",
    "1  - Create user",
    "2  - List users",
    "3  - Edit user",
    "4  - Remove user",
    "0  - Exit",
];

/// Yes answers: `s`/`sim` as well as `y`/`yes`, any case.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "s" | "sim" | "y" | "yes"
    )
}

pub struct Session<S, C> {
    store: S,
    console: C,
    state: SessionState,
    closed: bool,
}

impl<S: UserStore, C: Console> Session<S, C> {
    pub fn new(store: S, console: C) -> Self {
        Self {
            store,
            console,
            state: SessionState::Running,
            closed: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[cfg(test)]
    pub fn console(&self) -> &C {
        &self.console
    }

    /// Run the menu until the session leaves `Running`.
    pub async fn run(&mut self) {
        while self.state == SessionState::Running {
            self.print_menu();
            if let Err(err) = self.step().await {
                if let Some(InputError::EndOfInput) = err.downcast_ref::<InputError>() {
                    debug!("input exhausted, leaving menu");
                    self.state = SessionState::Exiting;
                } else {
                    error!("unexpected error in menu loop: {err:#}");
                    self.say(&format!("Unexpected error: {err:#}"));
                }
            }
        }
    }

    /// Operator interrupt: leave the menu immediately.
    pub fn interrupt(&mut self) {
        self.say("\n\nInterrupted by user.");
        self.state = SessionState::Exiting;
    }

    /// Close the store once. Failure is reported, never fatal.
    pub async fn close(&mut self) {
        self.state = SessionState::Exiting;
        if self.closed {
            return;
        }
        self.closed = true;

        match self.store.close().await {
            Ok(()) => self.say("✅ Database connection closed."),
            Err(err) => {
                warn!("failed to close store: {err}");
                self.say("⚠️  Failed to close database connection.");
            }
        }
    }

    async fn step(&mut self) -> Result<()> {
        let choice = self.prompt("Choose an option: ").await?;

        match MenuOption::parse(choice.trim()) {
            Some(MenuOption::Create) => self.create_user().await?,
            Some(MenuOption::List) => self.list_users().await,
            Some(MenuOption::Edit) => self.edit_user().await?,
            Some(MenuOption::Remove) => self.remove_user().await?,
            Some(MenuOption::Exit) => {
                self.say("\nShutting down...");
                if self.confirm("Are you sure? (s/n): ").await? {
                    self.state = SessionState::Exiting;
                }
            }
            None => self.say("❌ Invalid option! Try again."),
        }

        Ok(())
    }

    fn print_menu(&mut self) {
        let rule = "=".repeat(50);
        self.say(&format!("\n{rule}"));
        self.say("           MAIN MENU");
        self.say(&rule);
        for line in MENU {
            self.say(line);
        }
        self.say(&rule);
    }

    async fn create_user(&mut self) -> Result<()> {
        let name = self.prompt("Name: ").await?;
        let email = self.prompt("Email: ").await?;
        let password = self.prompt("Password: ").await?;
        let national_id = self.prompt("National ID: ").await?;
        let city = self.prompt("City: ").await?;
        let region = self.prompt("UF: ").await?;

        let user = match NewUser::new(&name, &email, &password, &national_id, &city, &region) {
            Ok(user) => user,
            Err(err) => {
                debug!("create rejected: {err}");
                self.say("All fields are required!");
                return Ok(());
            }
        };

        match self.store.create(&user).await {
            Ok(id) => self.say(&format!("User created successfully! ID: {id}")),
            Err(err) => {
                error!("create failed: {err}");
                self.say(&format!("Error creating user: {err}"));
            }
        }
        Ok(())
    }

    async fn list_users(&mut self) {
        match self.store.list().await {
            Ok(users) if users.is_empty() => self.say("No users found."),
            Ok(users) => {
                for line in report::user_table(&users) {
                    self.say(&line);
                }
            }
            Err(err) => {
                error!("list failed: {err}");
                self.say(&format!("Error listing users: {err}"));
            }
        }
    }

    async fn edit_user(&mut self) -> Result<()> {
        self.list_users().await;

        let Some(id) = self.prompt_id("\nID of the user to edit: ", "editing").await? else {
            return Ok(());
        };

        if !self.store.exists(id).await {
            self.say("User not found!");
            return Ok(());
        }

        let current = match self.store.get(id).await {
            Ok(user) => user,
            Err(err) => {
                self.report_failure("editing", &err);
                return Ok(());
            }
        };

        self.say("\nCurrent values (press Enter to keep):");
        self.say(&format!("Current name: {}", current.name));
        let name = self.prompt("New name: ").await?;
        self.say(&format!("Current email: {}", current.email));
        let email = self.prompt("New email: ").await?;
        self.say(&format!("Current national ID: {}", current.national_id));
        let national_id = self.prompt("New national ID: ").await?;
        self.say(&format!("Current city: {}", current.city));
        let city = self.prompt("New city: ").await?;
        self.say(&format!("Current UF: {}", current.region));
        let region = self.prompt("New UF: ").await?;

        let mut update = UserUpdate::from_current(&current)
            .name(&name)
            .email(&email)
            .national_id(&national_id)
            .city(&city)
            .region(&region);

        if self.confirm("Change password? (s/n): ").await? {
            let password = self.prompt("New password: ").await?;
            update = update.password(&password);
        }

        match self.store.update(&update).await {
            Ok(()) => self.say("User updated successfully!"),
            Err(err) => self.report_failure("editing", &err),
        }
        Ok(())
    }

    async fn remove_user(&mut self) -> Result<()> {
        self.list_users().await;

        let Some(id) = self.prompt_id("\nID of the user to remove: ", "removing").await? else {
            return Ok(());
        };

        if !self.store.exists(id).await {
            self.say("User not found!");
            return Ok(());
        }

        let question = format!("Are you sure you want to remove user ID {id}? (s/n): ");
        if !self.confirm(&question).await? {
            self.say("Operation cancelled.");
            return Ok(());
        }

        match self.store.delete(id).await {
            Ok(()) => self.say("User removed successfully!"),
            Err(err) => self.report_failure("removing", &err),
        }
        Ok(())
    }

    /// Read an identifier. Non-numeric input is reported and yields `None`.
    async fn prompt_id(&mut self, prompt: &str, action: &str) -> Result<Option<UserId>> {
        let raw = self.prompt(prompt).await?;
        match parse_id(&raw) {
            Ok(id) => Ok(Some(id)),
            Err(err) => {
                self.say(&format!("Error {action} user: {err}"));
                Ok(None)
            }
        }
    }

    async fn prompt(&mut self, prompt: &str) -> Result<String> {
        match self.console.read_line(prompt).await? {
            Some(line) => Ok(line),
            None => Err(InputError::EndOfInput.into()),
        }
    }

    async fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = self.prompt(question).await?;
        Ok(is_affirmative(&answer))
    }

    fn report_failure(&mut self, action: &str, err: &StoreError) {
        error!("{action} user failed: {err}");
        self.say(&format!("Error {action} user: {err}"));
    }

    fn say(&mut self, line: &str) {
        self.console.say(line);
    }
}

fn parse_id(raw: &str) -> Result<UserId, InputError> {
    raw.trim()
        .parse()
        .map_err(|_| InputError::InvalidId(raw.trim().to_string()))
}
