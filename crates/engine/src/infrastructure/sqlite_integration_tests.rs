use chrono::{Duration, TimeZone, Utc};

use taleforge_domain::{
    Character, CharacterRef, Chat, Message, MessageRole, Universe, UniverseRef, UserId,
};

use crate::infrastructure::ports::{
    CharacterRepo, ChatRepo, CustomUniverseRepo, MessageRepo, UniverseRepo,
};
use crate::infrastructure::sqlite::SqliteRepositories;

async fn open_repos(dir: &tempfile::TempDir) -> SqliteRepositories {
    let db_path = dir.path().join("taleforge.db");
    SqliteRepositories::new(&db_path.to_string_lossy())
        .await
        .expect("open repositories")
}

#[tokio::test]
async fn chat_with_references_survives_restart() {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();

    let user_id = UserId::new();
    let universe = Universe::new("Bobiverse", "Probes", "You narrate.", now);
    let character = Character::new(universe.id, "Bob", "An engineer", now).protagonist();
    let chat = Chat::new(user_id, "New Adventure", now)
        .with_model("openai/gpt-4o-mini")
        .with_universe(UniverseRef::Standard(universe.id))
        .with_character(CharacterRef::Standard(character.id));
    let chat_id = chat.id;

    {
        let repos = open_repos(&temp_dir).await;
        repos.universe.save(&universe).await.expect("save universe");
        repos
            .character
            .save(&character)
            .await
            .expect("save character");
        repos.chat.save(&chat).await.expect("save chat");
    }

    // Reopen against the same file to simulate a restart.
    let repos = open_repos(&temp_dir).await;
    let loaded = repos
        .chat
        .get(chat_id)
        .await
        .expect("get chat")
        .expect("chat should exist");

    assert_eq!(loaded.title, "New Adventure");
    assert_eq!(loaded.model.as_deref(), Some("openai/gpt-4o-mini"));
    assert_eq!(loaded.universe, Some(UniverseRef::Standard(universe.id)));
    assert_eq!(loaded.character, Some(CharacterRef::Standard(character.id)));
    assert!(loaded.is_owned_by(user_id));
}

#[tokio::test]
async fn messages_list_in_insertion_order_despite_equal_timestamps() {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let repos = open_repos(&temp_dir).await;

    let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let user_id = UserId::new();
    let chat = Chat::new(user_id, "New Adventure", now);
    repos.chat.save(&chat).await.expect("save chat");

    let first = Message::new(chat.id, user_id, MessageRole::User, "one", now);
    let second = Message::new(chat.id, user_id, MessageRole::Assistant, "two", now);
    let third = Message::new(
        chat.id,
        user_id,
        MessageRole::User,
        "three",
        now + Duration::seconds(1),
    );
    repos.message.save(&first).await.expect("save first");
    repos.message.save(&second).await.expect("save second");
    repos.message.save(&third).await.expect("save third");

    let history = repos
        .message
        .list_for_chat(chat.id)
        .await
        .expect("list messages");
    let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["one", "two", "three"]);
    assert_eq!(history[1].role, MessageRole::Assistant);
}

#[tokio::test]
async fn update_title_on_missing_chat_reports_not_found() {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let repos = open_repos(&temp_dir).await;

    let error = repos
        .chat
        .update_title(
            taleforge_domain::ChatId::new(),
            "Ghost title",
            Utc::now(),
        )
        .await
        .expect_err("missing chat must be reported");
    assert!(error.is_not_found());
}

#[tokio::test]
async fn deleting_chat_messages_leaves_other_chats_alone() {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let repos = open_repos(&temp_dir).await;

    let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let user_id = UserId::new();
    let doomed = Chat::new(user_id, "Doomed", now);
    let kept = Chat::new(user_id, "Kept", now);
    repos.chat.save(&doomed).await.expect("save doomed");
    repos.chat.save(&kept).await.expect("save kept");

    for chat_id in [doomed.id, kept.id] {
        let message = Message::new(chat_id, user_id, MessageRole::User, "hi", now);
        repos.message.save(&message).await.expect("save message");
    }

    repos
        .message
        .delete_for_chat(doomed.id)
        .await
        .expect("delete messages");

    let gone = repos
        .message
        .list_for_chat(doomed.id)
        .await
        .expect("list doomed");
    let kept_history = repos
        .message
        .list_for_chat(kept.id)
        .await
        .expect("list kept");
    assert!(gone.is_empty());
    assert_eq!(kept_history.len(), 1);
}

#[tokio::test]
async fn save_is_an_upsert_and_listings_are_owner_scoped() {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let repos = open_repos(&temp_dir).await;

    let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let owner = UserId::new();
    let stranger = UserId::new();

    let mut universe =
        taleforge_domain::CustomUniverse::new(owner, "Clockwork Seas", "Brass", "Prompt v1", now);
    repos
        .custom_universe
        .save(&universe)
        .await
        .expect("insert");

    universe.system_prompt = "Prompt v2".to_string();
    universe.updated_at = now + Duration::minutes(5);
    repos
        .custom_universe
        .save(&universe)
        .await
        .expect("update");

    let loaded = repos
        .custom_universe
        .get(universe.id)
        .await
        .expect("get")
        .expect("universe should exist");
    assert_eq!(loaded.system_prompt, "Prompt v2");

    let mine = repos
        .custom_universe
        .list_for_user(owner)
        .await
        .expect("list owner");
    let theirs = repos
        .custom_universe
        .list_for_user(stranger)
        .await
        .expect("list stranger");
    assert_eq!(mine.len(), 1);
    assert!(theirs.is_empty());
}

#[tokio::test]
async fn protagonist_listing_filters_by_universe_and_flag() {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let repos = open_repos(&temp_dir).await;

    let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let bobiverse = Universe::new("Bobiverse", "Probes", "You narrate.", now);
    let other = Universe::new("Clockwork Seas", "Brass", "You narrate.", now);
    repos.universe.save(&bobiverse).await.expect("save");
    repos.universe.save(&other).await.expect("save");

    let bob = Character::new(bobiverse.id, "Bob", "Engineer", now).protagonist();
    let guppi = Character::new(bobiverse.id, "GUPPI", "Ship AI", now);
    let elsewhere = Character::new(other.id, "Kestrel", "Courier", now).protagonist();
    for character in [&bob, &guppi, &elsewhere] {
        repos.character.save(character).await.expect("save");
    }

    let protagonists = repos
        .character
        .list_protagonists_for_universe(bobiverse.id)
        .await
        .expect("list protagonists");
    assert_eq!(protagonists.len(), 1);
    assert_eq!(protagonists[0].name, "Bob");

    let roster = repos
        .character
        .list_for_universe(bobiverse.id)
        .await
        .expect("list roster");
    assert_eq!(roster.len(), 2);
}

#[tokio::test]
async fn chats_list_most_recently_touched_first() {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let repos = open_repos(&temp_dir).await;

    let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let user_id = UserId::new();
    let older = Chat::new(user_id, "Older", now);
    let newer = Chat::new(user_id, "Newer", now + Duration::minutes(1));
    repos.chat.save(&older).await.expect("save older");
    repos.chat.save(&newer).await.expect("save newer");

    repos
        .chat
        .touch(older.id, now + Duration::minutes(10))
        .await
        .expect("touch older");

    let chats = repos
        .chat
        .list_for_user(user_id)
        .await
        .expect("list chats");
    let titles: Vec<&str> = chats.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["Older", "Newer"]);
}
