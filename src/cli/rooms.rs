use std::error::Error;
use std::io::Write;

use crate::api::models::ChatRoom;
use crate::api::ApiClient;

/// Print the room table. Kept separate from the request so output can be
/// checked against any writer.
pub fn write_room_list<W: Write>(out: &mut W, rooms: &[ChatRoom]) -> std::io::Result<()> {
    if rooms.is_empty() {
        writeln!(out, "No chat rooms yet. Create one with `roomchat rooms create NAME`.")?;
        return Ok(());
    }
    writeln!(out, "Chat rooms:")?;
    for room in rooms {
        write_room_line(out, room)?;
    }
    Ok(())
}

fn write_room_line<W: Write>(out: &mut W, room: &ChatRoom) -> std::io::Result<()> {
    match &room.created_at {
        Some(created) => writeln!(out, "  {:>5}  {}  (created {})", room.id, room.name, created),
        None => writeln!(out, "  {:>5}  {}", room.id, room.name),
    }
}

pub async fn list_rooms(client: &mut ApiClient) -> Result<(), Box<dyn Error>> {
    let rooms = client.get_chat_rooms().await?;
    write_room_list(&mut std::io::stdout().lock(), &rooms)?;
    Ok(())
}

pub async fn show_room(client: &mut ApiClient, id: i64) -> Result<(), Box<dyn Error>> {
    let room = client.get_chat_room_detail(id).await?;
    write_room_line(&mut std::io::stdout().lock(), &room)?;
    Ok(())
}

pub async fn create_room(client: &mut ApiClient, name: &str) -> Result<(), Box<dyn Error>> {
    let room = client.create_chat_room(name).await?;
    println!("✅ Created room \"{}\" (id {})", room.name, room.id);
    Ok(())
}

pub async fn rename_room(client: &mut ApiClient, id: i64, name: &str) -> Result<(), Box<dyn Error>> {
    let room = client.update_chat_room(id, name).await?;
    println!("✅ Renamed room {} to \"{}\"", room.id, room.name);
    Ok(())
}

pub async fn delete_room(client: &mut ApiClient, id: i64) -> Result<(), Box<dyn Error>> {
    client.delete_chat_room(id).await?;
    println!("✅ Deleted room {id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_list_shows_ids_and_names() {
        let rooms = vec![
            ChatRoom {
                id: 1,
                name: "General".to_string(),
                created_at: Some("2025-01-01T00:00:00Z".to_string()),
            },
            ChatRoom {
                id: 12,
                name: "Random".to_string(),
                created_at: None,
            },
        ];
        let mut out = Vec::new();
        write_room_list(&mut out, &rooms).expect("write");
        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(
            text,
            "Chat rooms:\n      1  General  (created 2025-01-01T00:00:00Z)\n     12  Random\n"
        );
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn room_list_reports_write_failures() {
        let err = write_room_list(&mut ClosedPipe, &[]).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn empty_room_list_hints_at_create() {
        let mut out = Vec::new();
        write_room_list(&mut out, &[]).expect("write");
        assert!(String::from_utf8(out).unwrap().contains("rooms create"));
    }
}
