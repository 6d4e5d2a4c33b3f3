//! Canonical team names. Containment matching is only a fallback for labels
//! the dictionary does not know.

struct TeamInfo {
    name: &'static str,
    nickname: &'static str,
    city: Option<&'static str>,
    aliases: &'static [&'static str],
}

const TEAMS: &[TeamInfo] = &[
    TeamInfo { name: "Atlanta Hawks", nickname: "Hawks", city: Some("Atlanta"), aliases: &["ATL"] },
    TeamInfo { name: "Boston Celtics", nickname: "Celtics", city: Some("Boston"), aliases: &["BOS"] },
    TeamInfo { name: "Brooklyn Nets", nickname: "Nets", city: Some("Brooklyn"), aliases: &["BKN", "BRK", "BK"] },
    TeamInfo { name: "Charlotte Hornets", nickname: "Hornets", city: Some("Charlotte"), aliases: &["CHA", "CHO"] },
    TeamInfo { name: "Chicago Bulls", nickname: "Bulls", city: Some("Chicago"), aliases: &["CHI"] },
    TeamInfo { name: "Cleveland Cavaliers", nickname: "Cavaliers", city: Some("Cleveland"), aliases: &["CLE", "Cavs"] },
    TeamInfo { name: "Dallas Mavericks", nickname: "Mavericks", city: Some("Dallas"), aliases: &["DAL", "Mavs"] },
    TeamInfo { name: "Denver Nuggets", nickname: "Nuggets", city: Some("Denver"), aliases: &["DEN"] },
    TeamInfo { name: "Detroit Pistons", nickname: "Pistons", city: Some("Detroit"), aliases: &["DET"] },
    TeamInfo { name: "Golden State Warriors", nickname: "Warriors", city: Some("Golden State"), aliases: &["GSW", "GS"] },
    TeamInfo { name: "Houston Rockets", nickname: "Rockets", city: Some("Houston"), aliases: &["HOU"] },
    TeamInfo { name: "Indiana Pacers", nickname: "Pacers", city: Some("Indiana"), aliases: &["IND"] },
    TeamInfo { name: "Los Angeles Clippers", nickname: "Clippers", city: None, aliases: &["LAC", "LA Clippers"] },
    TeamInfo { name: "Los Angeles Lakers", nickname: "Lakers", city: None, aliases: &["LAL", "LA Lakers"] },
    TeamInfo { name: "Memphis Grizzlies", nickname: "Grizzlies", city: Some("Memphis"), aliases: &["MEM"] },
    TeamInfo { name: "Miami Heat", nickname: "Heat", city: Some("Miami"), aliases: &["MIA"] },
    TeamInfo { name: "Milwaukee Bucks", nickname: "Bucks", city: Some("Milwaukee"), aliases: &["MIL"] },
    TeamInfo { name: "Minnesota Timberwolves", nickname: "Timberwolves", city: Some("Minnesota"), aliases: &["MIN", "Wolves"] },
    TeamInfo { name: "New Orleans Pelicans", nickname: "Pelicans", city: Some("New Orleans"), aliases: &["NOP", "NO", "NOR"] },
    TeamInfo { name: "New York Knicks", nickname: "Knicks", city: Some("New York"), aliases: &["NYK", "NY"] },
    TeamInfo { name: "Oklahoma City Thunder", nickname: "Thunder", city: Some("Oklahoma City"), aliases: &["OKC"] },
    TeamInfo { name: "Orlando Magic", nickname: "Magic", city: Some("Orlando"), aliases: &["ORL"] },
    TeamInfo { name: "Philadelphia 76ers", nickname: "76ers", city: Some("Philadelphia"), aliases: &["PHI", "Sixers"] },
    TeamInfo { name: "Phoenix Suns", nickname: "Suns", city: Some("Phoenix"), aliases: &["PHX", "PHO"] },
    TeamInfo { name: "Portland Trail Blazers", nickname: "Trail Blazers", city: Some("Portland"), aliases: &["POR", "Blazers"] },
    TeamInfo { name: "Sacramento Kings", nickname: "Kings", city: Some("Sacramento"), aliases: &["SAC"] },
    TeamInfo { name: "San Antonio Spurs", nickname: "Spurs", city: Some("San Antonio"), aliases: &["SAS", "SA"] },
    TeamInfo { name: "Toronto Raptors", nickname: "Raptors", city: Some("Toronto"), aliases: &["TOR"] },
    TeamInfo { name: "Utah Jazz", nickname: "Jazz", city: Some("Utah"), aliases: &["UTA", "UTAH"] },
    TeamInfo { name: "Washington Wizards", nickname: "Wizards", city: Some("Washington"), aliases: &["WAS", "WSH"] },
];

pub fn league_size() -> usize {
    TEAMS.len()
}

fn normalize(raw: &str) -> String {
    let base = raw.split('(').next().unwrap_or_default();
    base.chars()
        .filter(|c| *c != '.')
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub fn canonical_team(raw: &str) -> Option<&'static str> {
    let key = normalize(raw);
    if key.is_empty() {
        return None;
    }

    for team in TEAMS {
        let exact = normalize(team.name) == key
            || normalize(team.nickname) == key
            || team.city.is_some_and(|c| normalize(c) == key)
            || team.aliases.iter().any(|a| normalize(a) == key);
        if exact {
            return Some(team.name);
        }
    }

    // Decorated labels ("Boston Celtics Defense", "vs Celtics"): accept only
    // a single team whose nickname appears as whole words.
    let padded = format!(" {key} ");
    let mut hits = TEAMS
        .iter()
        .filter(|team| padded.contains(&format!(" {} ", normalize(team.nickname))));
    let first = hits.next()?;
    if hits.next().is_some() {
        return None;
    }
    Some(first.name)
}

pub fn same_team(a: &str, b: &str) -> bool {
    match (canonical_team(a), canonical_team(b)) {
        (Some(x), Some(y)) => x == y,
        _ => normalize(a) == normalize(b),
    }
}

pub fn find_team(team: &str, candidates: &[&str]) -> Option<usize> {
    if let Some(canon) = canonical_team(team) {
        return candidates
            .iter()
            .position(|c| canonical_team(c) == Some(canon));
    }
    let needle = normalize(team);
    if needle.is_empty() {
        return None;
    }
    candidates.iter().position(|c| normalize(c).contains(&needle))
}
