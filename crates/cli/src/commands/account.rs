//! Account and session commands.

use std::path::Path;

use marigold_client::{
    ApiClient, AuthSession, PasswordChange, ProfileFields, ProfileUpdate, RegisterRequest,
};

use crate::{ProfileUpdateArgs, RegisterArgs};
use crate::format;

pub(crate) async fn register(
    api: &ApiClient,
    args: RegisterArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let request = RegisterRequest {
        username: args.username,
        email: args.email,
        password: args.password,
        password2: args.password2,
        first_name: args.first_name,
        last_name: args.last_name,
    };

    let created = api.register(&request).await?;
    println!("Account created for {}", created.username);
    println!("Log in with `marigold login {} --password ...`", created.username);

    Ok(())
}

pub(crate) async fn login(
    api: &ApiClient,
    username: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = AuthSession::new(api.clone());
    let user = session.login(username, password).await?;
    println!("Logged in as {}", user.display_name());

    Ok(())
}

pub(crate) fn logout(api: &ApiClient) -> Result<(), Box<dyn std::error::Error>> {
    let session = AuthSession::new(api.clone());
    session.logout()?;
    println!("Logged out");

    Ok(())
}

pub(crate) async fn whoami(api: &ApiClient) -> Result<(), Box<dyn std::error::Error>> {
    let session = super::authenticated_session(api).await?;

    // authenticated_session only returns with a user in place
    let Some(user) = session.user() else {
        return Err("no user in session".into());
    };

    println!("{} <{}>", user.display_name(), user.email);
    println!("  username: {}", user.username);
    if let Some(phone) = &user.profile.phone_number {
        println!("  phone: {phone}");
    }
    if let Some(address) = &user.profile.address {
        println!("  address: {address}");
    }
    if let (Some(city), Some(country)) = (&user.profile.city, &user.profile.country) {
        println!("  location: {city}, {country}");
    }
    if let Some(picture) = &user.profile.profile_picture {
        println!("  picture: {picture}");
    }
    println!("  member since: {}", format::date(user.profile.created_at));

    Ok(())
}

pub(crate) async fn update_profile(
    api: &ApiClient,
    args: ProfileUpdateArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = super::authenticated_session(api).await?;

    let update = ProfileUpdate {
        first_name: args.first_name,
        last_name: args.last_name,
        profile: ProfileFields {
            phone_number: args.phone_number,
            address: args.address,
            city: args.city,
            state: args.state,
            postal_code: args.postal_code,
            country: args.country,
            date_of_birth: args.date_of_birth,
        },
    };

    api.update_profile(&update).await?;
    // Re-fetch so the cached user matches what the backend stored.
    let user = session.refresh_user().await?;
    println!("Profile updated for {}", user.display_name());

    Ok(())
}

pub(crate) async fn change_password(
    api: &ApiClient,
    old: String,
    new: String,
    confirm: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let _session = super::authenticated_session(api).await?;

    let change = PasswordChange {
        old_password: old,
        new_password: new,
        confirm_password: confirm,
    };
    api.change_password(&change).await?;
    println!("Password updated");

    Ok(())
}

pub(crate) async fn upload_picture(
    api: &ApiClient,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = super::authenticated_session(api).await?;

    let picture = api.upload_profile_picture(path).await?;
    session.refresh_user().await?;

    match picture.profile_picture {
        Some(url) => println!("Profile picture updated: {url}"),
        None => println!("Profile picture updated"),
    }

    Ok(())
}
