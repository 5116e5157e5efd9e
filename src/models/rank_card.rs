use poise::serenity_prelude::Colour;

/// Custom rank card colour. Stored per user, shared by every guild.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RankCardColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl RankCardColor {
    pub const DEFAULT: RankCardColor = RankCardColor {
        red: 0x58,
        green: 0x65,
        blue: 0xF2,
    };

    pub fn new(red: u8, green: u8, blue: u8) -> RankCardColor {
        RankCardColor { red, green, blue }
    }
}

impl From<RankCardColor> for Colour {
    fn from(value: RankCardColor) -> Self {
        Colour::from_rgb(value.red, value.green, value.blue)
    }
}

impl From<Colour> for RankCardColor {
    fn from(value: Colour) -> Self {
        RankCardColor::new(value.r(), value.g(), value.b())
    }
}
