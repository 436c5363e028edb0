//! Skill profiles
//!
//! The radio and music skills share one implementation; a profile supplies
//! what differs between them: phrase tables, spoken messages and default
//! options.

use crate::command::PlayerCommand;
use crate::phrase::PhraseTable;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use vesna_core::{MediaSource, SkillOptions, Station, StepSize, VolumeSteps};

/// Built-in skill kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillKind {
    Radio,
    Music,
}

impl SkillKind {
    /// Profile for this kind
    pub fn profile(self) -> SkillProfile {
        match self {
            Self::Radio => SkillProfile::radio(),
            Self::Music => SkillProfile::music(),
        }
    }
}

/// Spoken responses of a player skill
///
/// `None` means the skill stays silent. Templates may use `{name}` (track
/// name) and `{volume}` (percent).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Messages {
    pub starting: Option<String>,
    pub start_failed: String,
    pub not_playing: String,
    pub already_off: Option<String>,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub switch_failed: String,
    pub paused: Option<String>,
    pub resumed: Option<String>,
    pub louder: Option<String>,
    pub quieter: Option<String>,
    pub status: String,
    pub shuffled: Option<String>,
    pub unshuffled: Option<String>,
    pub sleep_armed: String,
    pub clarification: String,
    pub unavailable: String,
    pub failed: String,
}

/// Fill `{name}` and `{volume}` into a message template
pub fn render(template: &str, name: &str, volume: u8) -> String {
    template
        .replace("{name}", name)
        .replace("{volume}", &volume.to_string())
}

/// Everything that distinguishes one player skill from another
#[derive(Debug, Clone)]
pub struct SkillProfile {
    /// Skill id, also the options scope
    pub scope: String,

    /// Full trigger phrases, matched by longest prefix
    pub top_level: PhraseTable<PlayerCommand>,

    /// Short phrases accepted while the skill holds the context
    pub in_context: PhraseTable<PlayerCommand>,

    pub messages: Messages,

    /// Options used until the user stores their own
    pub default_options: SkillOptions,

    /// Fade in from silence when playback starts
    pub fade_in_on_start: bool,
}

fn volume_phrases(table: PhraseTable<PlayerCommand>) -> PhraseTable<PlayerCommand> {
    table
        .with("тише", PlayerCommand::Quieter(StepSize::Normal))
        .with("громче", PlayerCommand::Louder(StepSize::Normal))
        .with("чуть тише", PlayerCommand::Quieter(StepSize::Small))
        .with("чуть громче", PlayerCommand::Louder(StepSize::Small))
        .with("сильно тише", PlayerCommand::Quieter(StepSize::Large))
        .with("сильно громче", PlayerCommand::Louder(StepSize::Large))
}

impl SkillProfile {
    /// Internet radio
    pub fn radio() -> Self {
        let top_level = volume_phrases(
            PhraseTable::new()
                .with("радио|включи радио", PlayerCommand::Start)
                .with(
                    "поменяй радио|другое радио|смени радио",
                    PlayerCommand::SwitchStation,
                )
                .with("тихо|выключи радио|стоп", PlayerCommand::Stop)
                .with("пауза|паузу", PlayerCommand::Pause),
        )
        .with("потом выключи|спать", PlayerCommand::Sleep);

        let in_context = volume_phrases(
            PhraseTable::new()
                .with("другое|поменяй", PlayerCommand::SwitchStation)
                .with("пауза", PlayerCommand::Pause)
                .with("выключи", PlayerCommand::Stop),
        )
        .with("потом выключи|спать", PlayerCommand::Sleep)
        .with("еще", PlayerCommand::RepeatVolume);

        let mut default_options = SkillOptions::new(MediaSource::Stations(default_stations()));
        default_options.default_volume = 100;
        default_options.last_position = Some(0);

        Self {
            scope: "radio".to_string(),
            top_level,
            in_context,
            messages: Messages {
                starting: Some("включаю".to_string()),
                start_failed: "не нашла ни одной радиостанции".to_string(),
                not_playing: "радио не включено".to_string(),
                already_off: Some("было выключено".to_string()),
                next: None,
                previous: None,
                switch_failed: "не удалось переключить станцию".to_string(),
                paused: None,
                resumed: None,
                louder: None,
                quieter: None,
                status: "играет {name}, громкость {volume}%".to_string(),
                shuffled: None,
                unshuffled: None,
                sleep_armed: "выключу радио попозже".to_string(),
                clarification: "не разобрала. Что сделать с радио?".to_string(),
                unavailable: "радио сейчас недоступно".to_string(),
                failed: "с радио что-то не так".to_string(),
            },
            default_options,
            fade_in_on_start: true,
        }
    }

    /// Local music folder
    pub fn music() -> Self {
        let top_level = PhraseTable::new()
            .with(
                "включи музыку|запусти музыку|включи плеер",
                PlayerCommand::Start,
            )
            .with("пауза|останови музыку", PlayerCommand::Pause)
            .with("стоп музыка|выключи музыку", PlayerCommand::Stop)
            .with("следующий трек|вперед", PlayerCommand::Next)
            .with("предыдущий трек|назад", PlayerCommand::Previous)
            .with(
                "громче|увеличь громкость",
                PlayerCommand::Louder(StepSize::Normal),
            )
            .with(
                "тише|уменьши громкость",
                PlayerCommand::Quieter(StepSize::Normal),
            )
            .with("статус музыки|что играет", PlayerCommand::Status)
            .with(
                "перемешай музыку|случайный порядок",
                PlayerCommand::Shuffle,
            )
            .with(
                "музыку по порядку|отмени перемешивание",
                PlayerCommand::Unshuffle,
            )
            .with("выключи музыку потом", PlayerCommand::Sleep);

        let in_context = volume_phrases(
            PhraseTable::new()
                .with("пауза", PlayerCommand::Pause)
                .with("выключи|стоп", PlayerCommand::Stop)
                .with("дальше|следующий|другое", PlayerCommand::Next)
                .with("назад|предыдущий", PlayerCommand::Previous)
                .with("перемешай", PlayerCommand::Shuffle)
                .with("по порядку", PlayerCommand::Unshuffle)
                .with("что играет", PlayerCommand::Status),
        )
        .with("потом выключи|спать", PlayerCommand::Sleep)
        .with("еще", PlayerCommand::RepeatVolume);

        let mut default_options = SkillOptions::new(MediaSource::MusicFolder(PathBuf::from("music")));
        default_options.volume_steps = VolumeSteps {
            small: 5,
            normal: 10,
            large: 25,
        };

        Self {
            scope: "music".to_string(),
            top_level,
            in_context,
            messages: Messages {
                starting: Some("Включаю {name}".to_string()),
                start_failed: "Не удалось воспроизвести музыку. Проверьте папку с музыкой."
                    .to_string(),
                not_playing: "Музыка не играет".to_string(),
                already_off: Some("Музыка уже выключена".to_string()),
                next: Some("Следующий трек: {name}".to_string()),
                previous: Some("Предыдущий трек: {name}".to_string()),
                switch_failed: "Не удалось переключить трек".to_string(),
                paused: Some("Ставлю на паузу".to_string()),
                resumed: Some("Ставлю на воспроизведение".to_string()),
                louder: Some("Громкость увеличена до {volume}%".to_string()),
                quieter: Some("Громкость уменьшена до {volume}%".to_string()),
                status: "Сейчас играет: {name}, громкость: {volume}%".to_string(),
                shuffled: Some("Перемешала".to_string()),
                unshuffled: Some("Играю по порядку".to_string()),
                sleep_armed: "выключу музыку попозже".to_string(),
                clarification: "не разобрала. Что сделать с музыкой?".to_string(),
                unavailable: "Музыкальный плеер недоступен".to_string(),
                failed: "Не удалось выполнить команду".to_string(),
            },
            default_options,
            fade_in_on_start: false,
        }
    }
}

/// Stations shipped with the radio skill
pub fn default_stations() -> Vec<Station> {
    vec![
        Station::new(
            "https://kommersant77.hostingradio.ru:8085/kommersant64.mp3",
            "Коммерсант FM",
            ["коммерсант"],
        ),
        Station::new(
            "http://nashe1.hostingradio.ru/nashesongs.mp3",
            "Наше радио",
            ["наш"],
        ),
        Station::new(
            "https://orfeyfm.hostingradio.ru:8034/orfeyfm192.mp3",
            "Орфей",
            ["орфе"],
        ),
        Station::new(
            "https://rusradio.hostingradio.ru/rusradio128.mp3",
            "Русское радио",
            ["русск"],
        ),
        Station::new(
            "https://ep256.hostingradio.ru:8052/europaplus256.mp3",
            "Европа Плюс",
            ["европ"],
        ),
        Station::new(
            "https://maximum.hostingradio.ru/maximum128.mp3",
            "Maximum",
            ["макс"],
        ),
        Station::new("https://choco.hostingradio.ru:10010/fm", "Шоколад", ["шоколад"]),
    ]
}
