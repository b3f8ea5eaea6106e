//! Game-center payload builders for unit tests.

use serde_json::{json, Map, Value};

pub(crate) const EVENT_ID: &str = "2012090900";
pub(crate) const BRADY: &str = "00-0019596";
pub(crate) const WELKER: &str = "00-0020397";
pub(crate) const RIDLEY: &str = "00-0027926";

pub(crate) fn event(sequence: u32, club: &str, name: &str, stat: u32, yards: i64) -> Value {
    json!({
        "sequence": sequence,
        "clubcode": club,
        "playerName": name,
        "statId": stat,
        "yards": yards,
    })
}

pub(crate) fn play(qtr: &str, time: &str, yrdln: &str, desc: &str, players: Value) -> Value {
    json!({
        "qtr": qtr,
        "down": 1,
        "time": time,
        "yrdln": yrdln,
        "ydstogo": 10,
        "posteam": "NE",
        "desc": desc,
        "note": null,
        "players": players,
    })
}

/// `start` and `end` are `(qtr, time, yrdln)`.
pub(crate) fn drive(
    start: (&str, &str, &str),
    end: (&str, &str, &str),
    plays: &[(u32, Value)],
) -> Value {
    let mut by_id = Map::new();
    for (id, play) in plays {
        by_id.insert(id.to_string(), play.clone());
    }
    json!({
        "posteam": "NE",
        "redzone": false,
        "fds": 1,
        "result": "Punt",
        "penyds": 0,
        "ydsgained": 12,
        "postime": "1:05",
        "start": { "qtr": start.0, "time": start.1, "yrdln": start.2, "team": "NE" },
        "end": { "qtr": end.0, "time": end.1, "yrdln": end.2, "team": "NE" },
        "plays": Value::Object(by_id),
    })
}

pub(crate) fn completion() -> Value {
    play(
        "1",
        "15:00",
        "NE 20",
        "T.Brady pass short right to W.Welker to NE 32 for 12 yards",
        json!({
            BRADY: [event(1, "NE", "T.Brady", 15, 12)],
            WELKER: [event(2, "NE", "W.Welker", 21, 12), event(3, "NE", "W.Welker", 115, 0)],
            "0": [event(4, "NE", "", 4, 0)],
        }),
    )
}

pub(crate) fn incompletion() -> Value {
    play(
        "1",
        "14:20",
        "NE 32",
        "T.Brady pass incomplete deep left to W.Welker",
        json!({
            BRADY: [event(1, "NE", "T.Brady", 14, 0)],
            WELKER: [event(2, "NE", "W.Welker", 115, 0)],
        }),
    )
}

pub(crate) fn first_drive() -> Value {
    drive(
        ("1", "15:00", "NE 20"),
        ("1", "13:55", "NE 32"),
        &[(36, completion()), (57, incompletion())],
    )
}

/// A first-quarter NE vs MIA game with one NE drive of two plays.
pub(crate) fn sample_game() -> Value {
    json!({
        "home": {
            "abbr": "NE",
            "to": 3,
            "score": { "1": 0, "2": 0, "3": 0, "4": 0, "5": 0, "T": 0 },
            "stats": {
                "passing": {
                    BRADY: { "name": "T.Brady", "att": 2, "cmp": 1, "yds": 12, "tds": 0, "ints": 0 }
                },
                "receiving": {
                    WELKER: { "name": "W.Welker", "rec": 1, "yds": 10, "tds": 0 }
                },
                "team": { "totfd": 1, "totyds": 12, "pt": 1, "top": "1:05" }
            }
        },
        "away": {
            "abbr": "MIA",
            "to": 3,
            "score": { "1": 0, "2": 0, "3": 0, "4": 0, "5": 0, "T": 0 },
            "stats": { "team": { "totfd": 0, "totyds": 0, "top": "0:00" } }
        },
        "drives": { "1": first_drive(), "crntdrv": 1 },
        "scrsummary": {},
        "qtr": "1",
        "clock": "13:55",
        "down": 0,
        "togo": 0,
        "posteam": "MIA",
        "redzone": false,
    })
}

/// Wraps a game record the way the feed does.
pub(crate) fn payload(event_id: &str, game: Value) -> Vec<u8> {
    let mut top = Map::new();
    top.insert(event_id.to_string(), game);
    top.insert("nextupdate".to_string(), json!(12));
    serde_json::to_vec(&Value::Object(top)).unwrap_or_default()
}
