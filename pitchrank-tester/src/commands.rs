//! Data-directory administration commands
use anyhow::{Context, Result, bail};
use colored::Colorize;
use pitchrank_core::{
    AllowAll, AwardChange, FacetFilter, Gender, ImageBlob, LeaderboardFilters, NewPlayer, Player,
    PlayerFeed, PlayerFilter, RankEngine,
};
use std::path::{Path, PathBuf};

use crate::store::{DirImageStore, FileDataLoader, FileStorage};
use crate::util::mime_for_path;

pub type FileEngine = RankEngine<FileDataLoader, FileStorage>;

/// Engine and feed for one data directory.
pub struct Workspace {
    pub engine: FileEngine,
    pub feed: PlayerFeed,
}

impl Workspace {
    pub fn open(dir: &Path) -> Result<Self> {
        let storage = FileStorage::new(dir);
        let feed = storage
            .load_feed()
            .with_context(|| format!("reading feed in {}", dir.display()))?;
        let engine = RankEngine::new(FileDataLoader::new(dir), storage)?;
        log::debug!(
            "opened {} with {} feed players",
            dir.display(),
            feed.len()
        );
        Ok(Self { engine, feed })
    }

    /// Resolve a local id, or any merged-roster player by ledger key.
    pub fn find_player(&self, needle: &str) -> Result<Player> {
        let roster = self.engine.roster(&self.feed)?;
        if let Ok(id) = needle.parse::<u64>()
            && let Some(player) = self
                .engine
                .local_players()?
                .into_iter()
                .find(|p| p.id == Some(id))
        {
            return Ok(player);
        }
        roster
            .into_iter()
            .find(|p| self.engine.player_key(p) == needle)
            .with_context(|| format!("no player matches `{needle}`"))
    }
}

fn describe(player: &Player) -> String {
    let mut line = format!("{} ({})", player.name.bold(), player.team_name);
    for detail in [&player.age_group, &player.league, &player.state] {
        if !detail.is_empty() {
            line.push_str(&format!(" {detail}"));
        }
    }
    if let Some(number) = &player.jersey_number {
        line.push_str(&format!(" #{number}"));
    }
    line
}

#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub name: String,
    pub team: String,
    pub age_group: String,
    pub league: String,
    pub state: String,
    pub gender: Option<String>,
}

impl ListOptions {
    fn into_filter(self) -> Result<PlayerFilter> {
        let gender = match self.gender.as_deref() {
            None => None,
            Some(raw) => Some(Gender::parse(raw).with_context(|| format!("unknown gender `{raw}`"))?),
        };
        Ok(PlayerFilter {
            age_group: FacetFilter::parse(&self.age_group),
            league: FacetFilter::parse(&self.league),
            state: FacetFilter::parse(&self.state),
            gender,
            name: self.name,
            team: self.team,
        })
    }
}

pub fn list_players(ws: &Workspace, options: ListOptions) -> Result<()> {
    let filter = options.into_filter()?;
    let players = ws.engine.search(&ws.feed, &filter)?;
    if players.is_empty() {
        println!("{}", "No players match.".yellow());
        return Ok(());
    }
    for player in &players {
        let source = if player.id.is_some_and(|id| {
            ws.feed.find_by_id(id).is_some_and(|p| p.merge_key() == player.merge_key())
        }) {
            "feed".dimmed()
        } else {
            "local".cyan()
        };
        println!(
            "{:>12} {source:5} {}",
            ws.engine.player_key(player),
            describe(player)
        );
    }
    Ok(())
}

pub fn add_player(ws: &Workspace, entry: NewPlayer) -> Result<()> {
    let player = ws.engine.add_player(entry)?;
    println!(
        "{} {} as {}",
        "Added".green(),
        describe(&player),
        ws.engine.player_key(&player)
    );
    Ok(())
}

pub fn delete_player(ws: &Workspace, id: u64) -> Result<()> {
    if ws.engine.delete_player(id)? {
        println!("{} local player {id}", "Deleted".green());
        Ok(())
    } else {
        bail!("no local player with id {id}")
    }
}

pub fn claim_profile(ws: &Workspace, id: u64, owner: &str) -> Result<()> {
    let player = ws.engine.claim_profile(&AllowAll, id, owner)?;
    println!("{} {} for {owner}", "Claimed".green(), describe(&player));
    Ok(())
}

pub fn award(ws: &Workspace, needle: &str, badge_id: &str) -> Result<()> {
    let player = ws.find_player(needle)?;
    let change = ws.engine.toggle_award(&AllowAll, &player, badge_id)?;
    let badge = ws
        .engine
        .catalog()
        .get(badge_id)
        .map_or_else(|| badge_id.to_string(), |b| format!("{} {}", b.emoji, b.name));
    match change {
        AwardChange::Awarded => println!("{} {badge} to {}", "Awarded".green(), describe(&player)),
        AwardChange::Revoked => println!("{} {badge} from {}", "Revoked".yellow(), describe(&player)),
    }
    Ok(())
}

pub fn leaderboard(ws: &Workspace, badge_id: &str, filters: &LeaderboardFilters) -> Result<()> {
    let Some(badge) = ws.engine.catalog().get(badge_id) else {
        bail!("unknown badge `{badge_id}`");
    };
    println!("{}", format!("{} {} leaderboard", badge.emoji, badge.name).bright_cyan().bold());
    let rows = ws.engine.leaderboard(&ws.feed, badge_id, filters)?;
    if rows.is_empty() {
        println!("{}", "No players have earned this badge yet.".yellow());
    }
    for row in rows {
        println!(
            "{:>4} {} ×{}",
            row.marker.to_string(),
            describe(&row.player),
            row.badge_count
        );
    }
    Ok(())
}

pub fn summary(ws: &Workspace) -> Result<()> {
    let projection = ws.engine.summaries(&ws.feed)?;
    if projection.summaries.is_empty() {
        println!("{}", "No badges awarded yet.".yellow());
    }
    for summary in &projection.summaries {
        let badges: Vec<String> = summary
            .badges
            .iter()
            .map(|b| format!("{}×{}", b.badge.emoji, b.count))
            .collect();
        let team = if summary.player_info.team_name.is_empty() {
            String::new()
        } else {
            format!(" ({})", summary.player_info.team_name)
        };
        println!(
            "{:>3} {}{team} {}",
            summary.total_badges,
            summary.player_info.name.bold(),
            badges.join(" ")
        );
    }
    if !projection.backfill.is_empty() {
        println!(
            "{}",
            format!(
                "{} entries are missing player snapshots; run `backfill` to store them.",
                projection.backfill.len()
            )
            .dimmed()
        );
    }
    Ok(())
}

pub fn backfill(ws: &Workspace) -> Result<()> {
    let changed = ws.engine.backfill_snapshots(&ws.feed)?;
    println!("{} {changed} ledger snapshots", "Backfilled".green());
    Ok(())
}

pub fn facets(ws: &Workspace) -> Result<()> {
    let facets = ws.feed.facets();
    println!("Leagues:    {}", facets.leagues.join(", "));
    println!("States:     {}", facets.states.join(", "));
    println!("Age groups: {}", facets.age_groups.join(", "));
    Ok(())
}

pub async fn attach_photo(
    ws: &Workspace,
    id: u64,
    file: &Path,
    photo_dir: Option<PathBuf>,
    owner: &str,
) -> Result<()> {
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("reading {}", file.display()))?;
    let blob = ImageBlob::new(mime_for_path(file), bytes);
    let images = DirImageStore::new(photo_dir);
    let photo = ws.engine.attach_photo(&images, owner, id, &blob).await?;
    if photo.is_remote() {
        println!("{} photo at {}", "Stored".green(), photo.url());
    } else {
        println!("{} photo inline ({} bytes)", "Stored".green(), photo.url().len());
    }
    Ok(())
}

pub async fn detach_photo(
    ws: &Workspace,
    id: u64,
    photo_dir: Option<PathBuf>,
    owner: &str,
) -> Result<()> {
    let images = DirImageStore::new(photo_dir);
    ws.engine.detach_photo(&images, owner, id).await?;
    println!("{} photo for local player {id}", "Removed".green());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitchrank_core::RankStorage;
    use std::fs;

    fn scratch_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "pitchrank-cmd-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn seeded_workspace(label: &str) -> (PathBuf, Workspace) {
        let dir = scratch_dir(label);
        fs::write(
            dir.join("feed.json"),
            r#"[{"id": 77, "name": "Bo", "teamName": "Rapids", "league": "NPL", "state": "TX"}]"#,
        )
        .unwrap();
        let ws = Workspace::open(&dir).unwrap();
        ws.engine
            .add_player(NewPlayer {
                name: "Ana".to_string(),
                team_name: "Storm".to_string(),
                ..NewPlayer::default()
            })
            .unwrap();
        (dir, ws)
    }

    #[test]
    fn players_resolve_by_local_id_or_key() {
        let (dir, ws) = seeded_workspace("find");
        assert_eq!(ws.find_player("1").unwrap().name, "Ana");
        assert_eq!(ws.find_player("db_77").unwrap().name, "Bo");
        assert!(ws.find_player("db_5").is_err());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn award_toggles_feed_players() {
        let (dir, ws) = seeded_workspace("award");
        award(&ws, "db_77", "wall").unwrap();
        assert_eq!(ws.engine.ledger().unwrap().count("db_77", "wall"), 1);
        award(&ws, "db_77", "wall").unwrap();
        assert_eq!(ws.engine.ledger().unwrap().count("db_77", "wall"), 0);
        assert!(award(&ws, "db_77", "nope").is_err());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn shared_ids_award_the_player_that_was_named() {
        let dir = scratch_dir("shared");
        fs::write(
            dir.join("feed.json"),
            r#"[{"id": 1, "name": "Bea", "teamName": "Fire"}]"#,
        )
        .unwrap();
        let ws = Workspace::open(&dir).unwrap();
        ws.engine
            .add_player(NewPlayer {
                name: "Ana".to_string(),
                team_name: "Storm".to_string(),
                ..NewPlayer::default()
            })
            .unwrap();

        assert_eq!(ws.find_player("1").unwrap().name, "Ana");
        assert_eq!(ws.find_player("db_1").unwrap().name, "Bea");
        award(&ws, "1", "mvp").unwrap();
        let ledger = ws.engine.ledger().unwrap();
        assert_eq!(ledger.count("1", "mvp"), 1);
        assert_eq!(ledger.count("db_1", "mvp"), 0);

        let rows = ws
            .engine
            .leaderboard(&ws.feed, "mvp", &LeaderboardFilters::default())
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].player.name, "Ana");
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn leaderboard_rejects_unknown_badges() {
        let (dir, ws) = seeded_workspace("board");
        assert!(leaderboard(&ws, "nope", &LeaderboardFilters::default()).is_err());
        assert!(leaderboard(&ws, "mvp", &LeaderboardFilters::default()).is_ok());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn list_rejects_unknown_gender() {
        let (dir, ws) = seeded_workspace("list");
        let options = ListOptions {
            gender: Some("x".to_string()),
            ..ListOptions::default()
        };
        assert!(list_players(&ws, options).is_err());
        let _ = fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn photos_fall_back_inline_without_a_photo_dir() {
        let (dir, ws) = seeded_workspace("photo");
        let file = dir.join("face.png");
        fs::write(&file, [1_u8, 2, 3]).unwrap();

        attach_photo(&ws, 1, &file, None, "admin").await.unwrap();
        let stored = ws.engine.storage().load_players().unwrap();
        assert_eq!(stored[0].photo_url.as_deref(), Some("data:image/png;base64,AQID"));

        let hosted = dir.join("photos");
        attach_photo(&ws, 1, &file, Some(hosted.clone()), "admin")
            .await
            .unwrap();
        assert!(hosted.join("admin").join("1").exists());

        detach_photo(&ws, 1, Some(hosted.clone()), "admin").await.unwrap();
        assert!(!hosted.join("admin").join("1").exists());
        assert!(ws.engine.local_players().unwrap()[0].photo_url.is_none());
        let _ = fs::remove_dir_all(dir);
    }
}
