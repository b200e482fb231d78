//! Character classes, ascendancies, league modes and output language.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    Korean,
    English,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::Korean => "ko",
            Language::English => "en",
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ko" | "kr" | "korean" | "한국어" => Ok(Language::Korean),
            "en" | "english" | "영어" => Ok(Language::English),
            other => Err(format!("unsupported language: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseClass {
    Marauder,
    Duelist,
    Ranger,
    Shadow,
    Witch,
    Templar,
    Scion,
}

impl BaseClass {
    pub const ALL: [BaseClass; 7] = [
        BaseClass::Marauder,
        BaseClass::Duelist,
        BaseClass::Ranger,
        BaseClass::Shadow,
        BaseClass::Witch,
        BaseClass::Templar,
        BaseClass::Scion,
    ];

    pub fn english(self) -> &'static str {
        match self {
            BaseClass::Marauder => "Marauder",
            BaseClass::Duelist => "Duelist",
            BaseClass::Ranger => "Ranger",
            BaseClass::Shadow => "Shadow",
            BaseClass::Witch => "Witch",
            BaseClass::Templar => "Templar",
            BaseClass::Scion => "Scion",
        }
    }

    pub fn korean(self) -> &'static str {
        match self {
            BaseClass::Marauder => "머라우더",
            BaseClass::Duelist => "듀얼리스트",
            BaseClass::Ranger => "레인저",
            BaseClass::Shadow => "섀도우",
            BaseClass::Witch => "위치",
            BaseClass::Templar => "템플러",
            BaseClass::Scion => "사이온",
        }
    }

    pub fn label(self, lang: Language) -> &'static str {
        match lang {
            Language::Korean => self.korean(),
            Language::English => self.english(),
        }
    }

    pub fn ascendancies(self) -> &'static [Ascendancy] {
        use Ascendancy::*;
        match self {
            BaseClass::Marauder => &[Juggernaut, Berserker, Chieftain],
            BaseClass::Duelist => &[Slayer, Gladiator, Champion],
            BaseClass::Ranger => &[Deadeye, Raider, Pathfinder],
            BaseClass::Shadow => &[Assassin, Saboteur, Trickster],
            BaseClass::Witch => &[Necromancer, Elementalist, Occultist],
            BaseClass::Templar => &[Inquisitor, Hierophant, Guardian],
            BaseClass::Scion => &[Ascendant],
        }
    }
}

impl fmt::Display for BaseClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.english())
    }
}

impl FromStr for BaseClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        BaseClass::ALL
            .into_iter()
            .find(|c| c.english().eq_ignore_ascii_case(wanted) || c.korean() == wanted)
            .ok_or_else(|| format!("unknown class: {wanted}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ascendancy {
    Juggernaut,
    Berserker,
    Chieftain,
    Slayer,
    Gladiator,
    Champion,
    Deadeye,
    Raider,
    Pathfinder,
    Assassin,
    Saboteur,
    Trickster,
    Necromancer,
    Elementalist,
    Occultist,
    Inquisitor,
    Hierophant,
    Guardian,
    Ascendant,
}

impl Ascendancy {
    pub fn base_class(self) -> BaseClass {
        BaseClass::ALL
            .into_iter()
            .find(|c| c.ascendancies().contains(&self))
            .unwrap_or(BaseClass::Scion)
    }

    pub fn english(self) -> &'static str {
        use Ascendancy::*;
        match self {
            Juggernaut => "Juggernaut",
            Berserker => "Berserker",
            Chieftain => "Chieftain",
            Slayer => "Slayer",
            Gladiator => "Gladiator",
            Champion => "Champion",
            Deadeye => "Deadeye",
            Raider => "Raider",
            Pathfinder => "Pathfinder",
            Assassin => "Assassin",
            Saboteur => "Saboteur",
            Trickster => "Trickster",
            Necromancer => "Necromancer",
            Elementalist => "Elementalist",
            Occultist => "Occultist",
            Inquisitor => "Inquisitor",
            Hierophant => "Hierophant",
            Guardian => "Guardian",
            Ascendant => "Ascendant",
        }
    }

    pub fn korean(self) -> &'static str {
        use Ascendancy::*;
        match self {
            Juggernaut => "저거넛",
            Berserker => "버서커",
            Chieftain => "치프틴",
            Slayer => "슬레이어",
            Gladiator => "글래디에이터",
            Champion => "챔피언",
            Deadeye => "데드아이",
            Raider => "레이더",
            Pathfinder => "패스파인더",
            Assassin => "어쌔신",
            Saboteur => "사보추어",
            Trickster => "트릭스터",
            Necromancer => "네크로맨서",
            Elementalist => "엘리멘탈리스트",
            Occultist => "오컬티스트",
            Inquisitor => "인퀴지터",
            Hierophant => "하이로펀트",
            Guardian => "가디언",
            Ascendant => "어센던트",
        }
    }

    pub fn label(self, lang: Language) -> &'static str {
        match lang {
            Language::Korean => self.korean(),
            Language::English => self.english(),
        }
    }
}

impl fmt::Display for Ascendancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.english())
    }
}

impl FromStr for Ascendancy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        BaseClass::ALL
            .iter()
            .flat_map(|c| c.ascendancies())
            .copied()
            .find(|a| a.english().eq_ignore_ascii_case(wanted) || a.korean() == wanted)
            .ok_or_else(|| format!("unknown ascendancy: {wanted}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeagueMode {
    #[default]
    Softcore,
    Hardcore,
}

impl LeagueMode {
    pub fn label(self, lang: Language) -> &'static str {
        match (self, lang) {
            (LeagueMode::Softcore, Language::Korean) => "소프트코어",
            (LeagueMode::Hardcore, Language::Korean) => "하드코어",
            (LeagueMode::Softcore, Language::English) => "Softcore",
            (LeagueMode::Hardcore, Language::English) => "Hardcore",
        }
    }
}

impl FromStr for LeagueMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "softcore" | "sc" | "소프트코어" => Ok(LeagueMode::Softcore),
            "hardcore" | "hc" | "하드코어" => Ok(LeagueMode::Hardcore),
            other => Err(format!("unknown league mode: {other}")),
        }
    }
}

/// Placeholder season name when the current league could not be fetched.
pub fn season_placeholder(lang: Language) -> &'static str {
    match lang {
        Language::Korean => "시즌",
        Language::English => "Season",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_parse_from_either_language() {
        assert_eq!("witch".parse::<BaseClass>(), Ok(BaseClass::Witch));
        assert_eq!(" 템플러 ".parse::<BaseClass>(), Ok(BaseClass::Templar));
        assert!("Warrior".parse::<BaseClass>().is_err());
    }

    #[test]
    fn every_ascendancy_maps_back_to_its_class() {
        for class in BaseClass::ALL {
            for asc in class.ascendancies() {
                assert_eq!(asc.base_class(), class, "{asc}");
                assert_eq!(asc.korean().parse::<Ascendancy>(), Ok(*asc));
                assert_eq!(asc.english().to_uppercase().parse::<Ascendancy>(), Ok(*asc));
            }
        }
        assert_eq!(BaseClass::Scion.ascendancies(), [Ascendancy::Ascendant]);
    }

    #[test]
    fn league_mode_labels() {
        assert_eq!("HC".parse::<LeagueMode>(), Ok(LeagueMode::Hardcore));
        assert_eq!("소프트코어".parse::<LeagueMode>(), Ok(LeagueMode::Softcore));
        assert_eq!(LeagueMode::Hardcore.label(Language::Korean), "하드코어");
    }
}
