pub mod login;
pub mod whoami;

// Internal "interpreter" for `Action`.
mod run;

mod report;

#[derive(Debug)]
pub enum Action {
    Login(login::Args),
    Whoami(whoami::Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
