use super::App;
use super::output::form_error;
use anyhow::{Context, Result};
use std::io::BufRead;

fn read_password(password: Option<String>) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub async fn login(app: &App, username: &str, password: Option<String>) -> Result<()> {
    let password = read_password(password)?;
    app.api.login(username, &password).await.map_err(|e| {
        if e.is_auth_invalid() {
            anyhow::anyhow!("Wrong username or password")
        } else {
            form_error(e)
        }
    })?;
    println!("Logged in as {}", username);
    Ok(())
}

pub async fn logout(app: &App) -> Result<()> {
    app.api.logout().await?;
    println!("Logged out");
    Ok(())
}

pub async fn register(app: &App, username: &str, password: Option<String>) -> Result<()> {
    let password = read_password(password)?;
    app.api
        .register(username, &password)
        .await
        .map_err(form_error)?;
    println!("Registered {}. Log in with `speshal login {}`.", username, username);
    Ok(())
}

pub async fn whoami(app: &App) -> Result<()> {
    app.require_login().await?;
    let username = app.api.fetch_my_username().await?;
    println!("{}", username);
    Ok(())
}
