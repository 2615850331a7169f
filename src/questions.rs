//! Question bank lookup: canonical answers and rewards per tile difficulty.
//!
//! The bank's content is external to the game core; this module only exposes
//! the lookup surface the answer service needs. Questions are loaded from a
//! JSON file at startup, falling back to a small built-in set so the server
//! stays usable without any on-disk configuration.

use std::{env, fmt, fs, io::ErrorKind, path::PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

/// Default location on disk where the server looks for the question bank.
const DEFAULT_BANK_PATH: &str = "config/questions.json";
/// Environment variable that overrides [`DEFAULT_BANK_PATH`].
const BANK_PATH_ENV: &str = "TILE_QUEST_QUESTIONS_PATH";

/// Difficulty slot of a tile question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Lowest reward tier.
    Easy,
    /// Middle reward tier.
    Medium,
    /// Highest reward tier.
    Hard,
}

impl Difficulty {
    /// Stable string form used by storage backends and event payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single question with its canonical answer and reward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Tile the question is attached to.
    pub tile_id: u32,
    /// Difficulty slot within the tile.
    pub difficulty: Difficulty,
    /// Prompt shown to players.
    pub text: String,
    /// Multiple-choice options, including the correct one.
    pub options: Vec<String>,
    /// Canonical answer; never leaves the server.
    pub correct_answer: String,
    /// Credits awarded to the first correct answerer.
    pub credits: i64,
}

/// Read-only question bank keyed by (tile, difficulty).
#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Load the bank from disk, falling back to the built-in set when the
    /// file is missing or malformed.
    pub fn load() -> Self {
        let path = resolve_bank_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Vec<Question>>(&contents) {
                Ok(questions) => {
                    info!(
                        path = %path.display(),
                        count = questions.len(),
                        "loaded question bank"
                    );
                    Self { questions }
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse question bank; using built-in set"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "question bank file not found; using built-in set"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read question bank; using built-in set"
                );
                Self::default()
            }
        }
    }

    /// Build a bank from an explicit question list. Used by tests.
    pub fn from_questions(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// Look up the question for one (tile, difficulty) slot.
    pub fn lookup(&self, tile_id: u32, difficulty: Difficulty) -> Option<&Question> {
        self.questions
            .iter()
            .find(|q| q.tile_id == tile_id && q.difficulty == difficulty)
    }

    /// All questions attached to a tile, in bank order.
    pub fn for_tile(&self, tile_id: u32) -> Vec<&Question> {
        self.questions
            .iter()
            .filter(|q| q.tile_id == tile_id)
            .collect()
    }
}

impl Default for QuestionBank {
    fn default() -> Self {
        Self {
            questions: builtin_questions(),
        }
    }
}

fn resolve_bank_path() -> PathBuf {
    env::var(BANK_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_BANK_PATH))
}

fn question(
    tile_id: u32,
    difficulty: Difficulty,
    text: &str,
    options: &[&str],
    correct: &str,
    credits: i64,
) -> Question {
    Question {
        tile_id,
        difficulty,
        text: text.to_string(),
        options: options.iter().map(|s| s.to_string()).collect(),
        correct_answer: correct.to_string(),
        credits,
    }
}

fn builtin_questions() -> Vec<Question> {
    vec![
        question(
            1,
            Difficulty::Easy,
            "Which planet is closest to the sun?",
            &["Mercury", "Venus", "Mars", "Jupiter"],
            "Mercury",
            10,
        ),
        question(
            1,
            Difficulty::Medium,
            "How many moons does Mars have?",
            &["0", "1", "2", "4"],
            "2",
            20,
        ),
        question(
            1,
            Difficulty::Hard,
            "Which probe first flew past Neptune?",
            &["Voyager 1", "Voyager 2", "Pioneer 10", "New Horizons"],
            "Voyager 2",
            30,
        ),
        question(
            2,
            Difficulty::Easy,
            "What is the chemical symbol for gold?",
            &["Au", "Ag", "Gd", "Go"],
            "Au",
            10,
        ),
        question(
            2,
            Difficulty::Medium,
            "Which gas makes up most of Earth's atmosphere?",
            &["Oxygen", "Nitrogen", "Carbon dioxide", "Argon"],
            "Nitrogen",
            20,
        ),
        question(
            2,
            Difficulty::Hard,
            "What is the only metal that is liquid at room temperature?",
            &["Gallium", "Mercury", "Caesium", "Bromine"],
            "Mercury",
            30,
        ),
        question(
            3,
            Difficulty::Easy,
            "How many continents are there?",
            &["5", "6", "7", "8"],
            "7",
            10,
        ),
        question(
            3,
            Difficulty::Medium,
            "Which river is the longest in the world?",
            &["Amazon", "Nile", "Yangtze", "Mississippi"],
            "Nile",
            20,
        ),
        question(
            3,
            Difficulty::Hard,
            "Which country has the most time zones?",
            &["Russia", "USA", "France", "China"],
            "France",
            30,
        ),
    ]
}
