use poise::serenity_prelude::{ChannelId, GuildId, UserId};
use thiserror::Error;

use crate::models::{LevelUpChannel, RankCardColor};

pub trait DBConvertible: Sized {
    type DBType;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError>;

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError>;
}

#[derive(Debug, Error)]
pub enum DBFromConversionError {
    #[error("Invalid number: {0}")]
    InvalidNumber(i64),
    #[error("Invalid snowflake id: {0}")]
    InvalidId(i64),
}

#[derive(Debug, Error)]
pub enum DBToConversionError {
    #[error("Number does not fit into the database column: {0}")]
    OutOfRange(u64),
}

/// Snowflakes are stored as `i64`. Zero and negative values can never be valid
/// ids, and constructing an id from them would panic.
fn snowflake_from_db(value: i64) -> Result<u64, DBFromConversionError> {
    if value > 0 {
        Ok(value as u64)
    } else {
        Err(DBFromConversionError::InvalidId(value))
    }
}

fn snowflake_to_db(value: u64) -> Result<i64, DBToConversionError> {
    i64::try_from(value).map_err(|_| DBToConversionError::OutOfRange(value))
}

impl DBConvertible for UserId {
    type DBType = i64;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        snowflake_to_db(self.get())
    }

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        Ok(UserId::new(snowflake_from_db(*value)?))
    }
}

impl DBConvertible for GuildId {
    type DBType = i64;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        snowflake_to_db(self.get())
    }

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        Ok(GuildId::new(snowflake_from_db(*value)?))
    }
}

impl DBConvertible for ChannelId {
    type DBType = i64;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        snowflake_to_db(self.get())
    }

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        Ok(ChannelId::new(snowflake_from_db(*value)?))
    }
}

/// `NULL` is unset, `0` is the disabled sentinel, anything else is a channel id.
impl DBConvertible for LevelUpChannel {
    type DBType = Option<i64>;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        Ok(match self {
            LevelUpChannel::Unset => None,
            LevelUpChannel::Disabled => Some(0),
            LevelUpChannel::Channel(channel) => Some(channel.to_db()?),
        })
    }

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        match value {
            None => Ok(LevelUpChannel::Unset),
            Some(0) => Ok(LevelUpChannel::Disabled),
            Some(channel) => Ok(LevelUpChannel::Channel(ChannelId::from_db(channel)?)),
        }
    }
}

/// EXP amounts. The column is signed, the domain is not.
impl DBConvertible for u64 {
    type DBType = i64;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        i64::try_from(*self).map_err(|_| DBToConversionError::OutOfRange(*self))
    }

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        u64::try_from(*value).map_err(|_| DBFromConversionError::InvalidNumber(*value))
    }
}

impl DBConvertible for RankCardColor {
    type DBType = (i64, i64, i64);

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        Ok((self.red as _, self.green as _, self.blue as _))
    }

    fn from_db((red, green, blue): &Self::DBType) -> Result<Self, DBFromConversionError> {
        let channel = |value: i64| {
            u8::try_from(value).map_err(|_| DBFromConversionError::InvalidNumber(value))
        };

        Ok(RankCardColor::new(
            channel(*red)?,
            channel(*green)?,
            channel(*blue)?,
        ))
    }
}
