use game_types::{
    CategoryId, CategoryType, CustomCategory, Difficulty, DifficultyFilter, Language, Word,
};
use rand::Rng;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryInfo {
    pub id: &'static str,
    pub category_type: CategoryType,
    pub is_premium: bool,
}

impl CategoryInfo {
    const fn new(id: &'static str, category_type: CategoryType, is_premium: bool) -> Self {
        Self {
            id,
            category_type,
            is_premium,
        }
    }
}

pub const CATEGORIES: &[CategoryInfo] = &[
    CategoryInfo::new("personajes_biblicos", CategoryType::Biblical, false),
    CategoryInfo::new("libros_biblicos", CategoryType::Biblical, false),
    CategoryInfo::new("objetos_biblicos", CategoryType::Biblical, false),
    CategoryInfo::new("oficios_biblicos", CategoryType::Biblical, true),
    CategoryInfo::new("lugares_biblicos", CategoryType::Biblical, true),
    CategoryInfo::new("mujeres_biblicas", CategoryType::Biblical, true),
    CategoryInfo::new("conceptos_teologicos", CategoryType::Biblical, true),
    CategoryInfo::new("acciones", CategoryType::General, false),
    CategoryInfo::new("objetos", CategoryType::General, false),
    CategoryInfo::new("deportes", CategoryType::General, false),
    CategoryInfo::new("animales", CategoryType::General, true),
    CategoryInfo::new("comida", CategoryType::General, true),
    CategoryInfo::new("profesiones", CategoryType::General, true),
    CategoryInfo::new("herramientas", CategoryType::General, true),
];

pub fn category_info(id: &str) -> Option<&'static CategoryInfo> {
    CATEGORIES.iter().find(|c| c.id == id)
}

pub fn is_premium_category(id: &str) -> bool {
    category_info(id).is_some_and(|c| c.is_premium)
}

pub fn free_categories() -> impl Iterator<Item = &'static str> {
    CATEGORIES.iter().filter(|c| !c.is_premium).map(|c| c.id)
}

pub fn premium_categories() -> impl Iterator<Item = &'static str> {
    CATEGORIES.iter().filter(|c| c.is_premium).map(|c| c.id)
}

static SPANISH: LazyLock<WordBank> =
    LazyLock::new(|| WordBank::from_word_list(Language::Es, include_str!("../words/es.txt")));
static ENGLISH: LazyLock<WordBank> =
    LazyLock::new(|| WordBank::from_word_list(Language::En, include_str!("../words/en.txt")));

/// Everything `select_word` needs to build a candidate pool.
#[derive(Debug, Clone, Copy)]
pub struct WordRequest<'a> {
    pub categories: &'a [CategoryId],
    pub language: Language,
    pub custom_categories: &'a [CustomCategory],
    pub difficulty: DifficultyFilter,
    pub premium_allowed: bool,
}

/// Draw a word from the built-in bank of the requested language.
pub fn select_word<R: Rng + ?Sized>(request: &WordRequest<'_>, rng: &mut R) -> Word {
    WordBank::builtin(request.language).select_word(request, rng)
}

#[derive(Debug, Clone)]
pub struct WordBank {
    language: Language,
    words: Vec<Word>,
}

impl WordBank {
    pub fn builtin(language: Language) -> &'static WordBank {
        match language {
            Language::Es => &SPANISH,
            Language::En => &ENGLISH,
        }
    }

    /// Parse `category|difficulty|word|hint|impostor_hint` lines.
    /// Blank lines, `#` comments and malformed lines are skipped.
    pub fn from_word_list(language: Language, word_list: &str) -> Self {
        let mut per_category: HashMap<String, usize> = HashMap::new();
        let words = word_list
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| {
                let mut fields = line.split('|').map(str::trim);
                let category = fields.next().filter(|c| !c.is_empty())?;
                let difficulty = fields.next()?.parse::<Difficulty>().ok()?;
                let word = fields.next().filter(|w| !w.is_empty())?;
                let hint = fields.next().filter(|h| !h.is_empty()).map(str::to_string);
                let impostor_hint = fields.next().filter(|h| !h.is_empty()).map(str::to_string);

                let index = per_category.entry(category.to_string()).or_insert(0);
                *index += 1;

                Some(Word {
                    id: format!("{}_{}_{:03}", language.code(), category, index),
                    word: word.to_string(),
                    category: category.to_string(),
                    difficulty,
                    hint,
                    impostor_hint,
                })
            })
            .collect();

        Self { language, words }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn word_count_by_category(&self, category: &str) -> usize {
        self.words.iter().filter(|w| w.category == category).count()
    }

    /// First word of the free bank, used when nothing else can be drawn.
    pub fn fallback_word(&self) -> Word {
        self.words
            .iter()
            .find(|w| !is_premium_category(&w.category))
            .or_else(|| self.words.first())
            .cloned()
            .unwrap_or_else(|| default_word(self.language))
    }

    /// Draw a uniformly random word for the request. Never fails: an empty
    /// pool falls back to the standard categories without the difficulty
    /// filter, then to `fallback_word`.
    pub fn select_word<R: Rng + ?Sized>(&self, request: &WordRequest<'_>, rng: &mut R) -> Word {
        let (standard, custom): (Vec<&CategoryId>, Vec<&CategoryId>) = request
            .categories
            .iter()
            .partition(|id| !request.custom_categories.iter().any(|c| &c.id == *id));

        let tier_gated =
            |word: &&Word| request.premium_allowed || !is_premium_category(&word.category);
        let in_standard = |word: &&Word| standard.iter().any(|c| **c == word.category);

        let mut pool: Vec<Word> = self
            .words
            .iter()
            .filter(tier_gated)
            .filter(in_standard)
            .filter(|w| request.difficulty.accepts(w.difficulty))
            .cloned()
            .collect();

        for id in custom {
            if let Some(category) = request.custom_categories.iter().find(|c| &c.id == id) {
                pool.extend(category.words.iter().map(|literal| Word {
                    id: format!("{}_{}", category.id, Uuid::new_v4().simple()),
                    word: literal.clone(),
                    category: category.id.clone(),
                    difficulty: Difficulty::Medium,
                    hint: None,
                    impostor_hint: None,
                }));
            }
        }

        if pool.is_empty() {
            let fallback: Vec<&Word> = self
                .words
                .iter()
                .filter(tier_gated)
                .filter(in_standard)
                .collect();
            debug!(
                "No words for {:?} at {:?}, falling back to {} words",
                request.categories,
                request.difficulty,
                fallback.len()
            );
            if fallback.is_empty() {
                return self.fallback_word();
            }
            return fallback[rng.gen_range(0..fallback.len())].clone();
        }

        let index = rng.gen_range(0..pool.len());
        pool.swap_remove(index)
    }
}

fn default_word(language: Language) -> Word {
    let word = match language {
        Language::Es => "Moisés",
        Language::En => "Moses",
    };
    Word {
        id: format!("{}_default", language.code()),
        word: word.to_string(),
        category: "personajes_biblicos".to_string(),
        difficulty: Difficulty::Easy,
        hint: None,
        impostor_hint: None,
    }
}
