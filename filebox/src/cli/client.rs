use std::path::Path;

use client::Session;

/// Server address and account used by the client subcommands.
pub struct Target<'a> {
    pub uri: &'a str,
    pub username: &'a str,
    pub password: &'a str,
}

pub async fn signup(target: &Target<'_>) -> client::Result<()> {
    let reply = client::signup(target.uri, target.username, target.password).await?;
    println!("{}", reply.message);
    Ok(())
}

pub async fn status(target: &Target<'_>) -> client::Result<()> {
    let session = login(target).await?;
    let status = session.status().await?;
    match status.user {
        Some(user) => println!("logged in as {user}"),
        None => println!("not logged in"),
    }
    session.logout().await?;
    Ok(())
}

pub async fn upload(target: &Target<'_>, file: &Path) -> client::Result<()> {
    let session = login(target).await?;
    let record = session.upload(file).await?;
    println!(
        "file {} uploaded as {}. URL: {}",
        file.display(),
        record.filename,
        session.public_url(&record)
    );
    session.logout().await?;
    Ok(())
}

pub async fn list(target: &Target<'_>) -> client::Result<()> {
    let session = login(target).await?;
    let records = session.files().await?;
    println!("{}", client::files_table(&records));
    session.logout().await?;
    Ok(())
}

pub async fn delete(target: &Target<'_>, filename: &str) -> client::Result<()> {
    let session = login(target).await?;
    let reply = session.delete(filename).await?;
    println!("{}", reply.message);
    session.logout().await?;
    Ok(())
}

async fn login(target: &Target<'_>) -> client::Result<Session> {
    Session::login(target.uri, target.username, target.password).await
}
