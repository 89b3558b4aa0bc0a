//! Subcommand dispatch. Results go to stdout; failures bubble up to `main`
//! and are reported there.

use std::path::Path;

use amity_client::{Client, Picture, ProfileField};
use amity_shared::{Actor, ObjectUrl, ProfileValue};
use anyhow::{bail, Context, Result};

use crate::Commands;

pub async fn run(client: &mut Client, command: Commands, json: bool) -> Result<()> {
    match command {
        Commands::Whoami => {
            let me = client.actor().cloned().context("not logged in")?;
            let profile = client.profile_of(&me).await?;
            println!("{me}");
            if let Some(p) = profile {
                print_profile(&p, json)?;
            }
        }

        Commands::Friends => {
            client.refresh_friends().await?;
            let views = client.state().friends.clone();
            if json {
                println!("{}", serde_json::to_string_pretty(&views)?);
            } else {
                print_section(client, "Friends", &views.accepted).await?;
                print_section(client, "Friend requests", &views.incoming).await?;
                print_section(client, "Sent requests", &views.outgoing).await?;
            }
        }

        Commands::Add { peer } => {
            client.add_friend(&Actor::from(peer)).await?;
            println!("Request sent.");
        }
        Commands::Accept { peer } => {
            client.accept_request(&Actor::from(peer)).await?;
            println!("Request accepted.");
        }
        Commands::Reject { peer } => {
            client.reject_request(&Actor::from(peer)).await?;
            println!("Request rejected.");
        }
        Commands::Cancel { peer } => {
            client.cancel_request(&Actor::from(peer)).await?;
            println!("Request cancelled.");
        }
        Commands::Remove { peer } => {
            client.remove_friend(&Actor::from(peer)).await?;
            println!("Friend removed.");
        }

        Commands::Send { peer, text } => {
            client.select_peer(&Actor::from(peer))?;
            client.set_draft(text);
            match client.send_message().await? {
                Some(url) => println!("{url}"),
                None => bail!("message is empty"),
            }
        }

        Commands::Messages { peer } => {
            client.select_peer(&Actor::from(peer))?;
            let messages = client.list_messages().await?;
            for m in &messages {
                if json {
                    println!("{}", serde_json::to_string(&m.object)?);
                } else {
                    let edited = if m.value.edited { " (edited)" } else { "" };
                    println!("[{}] {}: {}{}", m.url(), m.sender(), m.value.content, edited);
                }
            }
        }

        Commands::Edit { peer, url, text } => {
            client.select_peer(&Actor::from(peer))?;
            let message = client.find_message(&ObjectUrl(url)).await?;
            client.start_edit(&message);
            client.set_draft(text);
            if client.update_message().await?.is_none() {
                bail!("replacement text is empty");
            }
            println!("Message edited.");
        }

        Commands::Delete { peer, url } => {
            client.select_peer(&Actor::from(peer))?;
            let message = client.find_message(&ObjectUrl(url)).await?;
            client.delete_message(&message).await?;
            println!("Message deleted.");
        }

        Commands::Profile { actor } => {
            let target = match actor {
                Some(a) => Actor::from(a),
                None => client.actor().cloned().context("not logged in")?,
            };
            match client.profile_of(&target).await? {
                Some(p) => print_profile(&p, json)?,
                None => println!("{target} has no profile."),
            }
        }

        Commands::SetProfile {
            name,
            pronouns,
            bio,
            picture,
            remove_picture,
        } => {
            if let Some(name) = name {
                client.set_profile_field(ProfileField::Name, name).await?;
            }
            if let Some(pronouns) = pronouns {
                client.set_profile_field(ProfileField::Pronouns, pronouns).await?;
            }
            if let Some(bio) = bio {
                client.set_profile_field(ProfileField::Bio, bio).await?;
            }
            if let Some(path) = picture {
                client.set_profile_picture(read_picture(&path).await?);
                client.save_profile().await?;
            } else if remove_picture {
                client.remove_profile_picture();
                client.save_profile().await?;
            }
            println!("Profile saved!");
        }

        Commands::Mood { peer, emoji } => {
            client.select_peer(&Actor::from(peer))?;
            if let Some(emoji) = emoji {
                client.set_mood(&emoji).await?;
            }
            for (actor, mood) in client.current_moods().await? {
                println!("{actor}: {}", mood.emoji);
            }
        }
    }
    Ok(())
}

async fn print_section(client: &Client, title: &str, peers: &[Actor]) -> Result<()> {
    println!("{title}:");
    for card in client.describe_peers(peers).await? {
        if card.name == card.id.as_str() {
            println!("  {}", card.id);
        } else {
            println!("  {} ({})", card.name, card.id);
        }
    }
    Ok(())
}

fn print_profile(profile: &ProfileValue, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(profile)?);
        return Ok(());
    }
    println!("Name:     {}", profile.name);
    if !profile.pronouns.is_empty() {
        println!("Pronouns: {}", profile.pronouns);
    }
    if !profile.bio.is_empty() {
        println!("Bio:      {}", profile.bio);
    }
    if !profile.icon.is_empty() {
        println!("Picture:  {}", profile.icon);
    }
    Ok(())
}

async fn read_picture(path: &Path) -> Result<Picture> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(Picture {
        mime_type: mime_for(path),
        name,
        bytes,
    })
}

fn mime_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string()
}
