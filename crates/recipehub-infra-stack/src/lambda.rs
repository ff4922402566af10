use serde::{Serialize, Serializer};
use std::{fmt, str::FromStr, time::Duration};
use strum::{Display, EnumString};

use crate::error::StackError;

const MIN_MEMORY: u32 = 128;
const MAX_MEMORY: u32 = 10240;
const MAX_TIMEOUT: u32 = 900;

/// Memory allocated to a function, in megabytes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Memory(u32);

impl Memory {
    pub fn new(mb: u32) -> Result<Memory, StackError> {
        if !(MIN_MEMORY..=MAX_MEMORY).contains(&mb) {
            return Err(StackError::InvalidMemory(mb));
        }
        Ok(Memory(mb))
    }

    pub fn megabytes(&self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for Memory {
    type Error = StackError;

    fn try_from(mb: u32) -> Result<Memory, Self::Error> {
        Memory::new(mb)
    }
}

impl FromStr for Memory {
    type Err = StackError;

    fn from_str(s: &str) -> Result<Memory, Self::Err> {
        let mb = u32::from_str(s).map_err(|e| StackError::InvalidNumber(s.into(), e))?;
        Memory::new(mb)
    }
}

impl fmt::Display for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How long a function can run, in seconds.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Timeout(u32);

impl Timeout {
    pub fn new(secs: u32) -> Result<Timeout, StackError> {
        if secs == 0 || secs > MAX_TIMEOUT {
            return Err(StackError::InvalidTimeout(secs));
        }
        Ok(Timeout(secs))
    }

    pub fn seconds(&self) -> u32 {
        self.0
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.0 as u64)
    }
}

impl Default for Timeout {
    fn default() -> Self {
        Timeout(30)
    }
}

impl TryFrom<u32> for Timeout {
    type Error = StackError;

    fn try_from(secs: u32) -> Result<Timeout, Self::Error> {
        Timeout::new(secs)
    }
}

impl FromStr for Timeout {
    type Err = StackError;

    fn from_str(s: &str) -> Result<Timeout, Self::Err> {
        let secs = u32::from_str(s).map_err(|e| StackError::InvalidNumber(s.into(), e))?;
        Timeout::new(secs)
    }
}

#[derive(Clone, Copy, Debug, Default, Display, EnumString, Eq, PartialEq)]
pub enum Architecture {
    #[default]
    #[strum(serialize = "x86_64")]
    X86_64,
    #[strum(serialize = "arm64")]
    Arm64,
}

#[derive(Clone, Copy, Debug, Display, EnumString, Eq, PartialEq)]
pub enum FunctionUrlAuthType {
    #[strum(serialize = "NONE")]
    None,
    #[strum(serialize = "AWS_IAM")]
    AwsIam,
}

#[derive(Clone, Copy, Debug, Display, EnumString, Eq, PartialEq)]
#[strum(ascii_case_insensitive)]
pub enum HttpMethod {
    #[strum(serialize = "*")]
    All,
    #[strum(serialize = "GET")]
    Get,
    #[strum(serialize = "PUT")]
    Put,
    #[strum(serialize = "HEAD")]
    Head,
    #[strum(serialize = "POST")]
    Post,
    #[strum(serialize = "PATCH")]
    Patch,
    #[strum(serialize = "DELETE")]
    Delete,
}

// Templates spell these values the same way they are displayed.
macro_rules! serialize_with_display {
    ($($ty:ty),+) => {
        $(
            impl Serialize for $ty {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serializer.collect_str(self)
                }
            }
        )+
    };
}

serialize_with_display!(Architecture, FunctionUrlAuthType, HttpMethod);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_limits() {
        assert_eq!(512, Memory::new(512).unwrap().megabytes());
        assert_eq!(128, Memory::new(128).unwrap().megabytes());
        assert_eq!(10240, Memory::new(10240).unwrap().megabytes());
        Memory::new(64).expect_err("too little memory");
        Memory::new(10241).expect_err("too much memory");
        "abc".parse::<Memory>().expect_err("not a number");
    }

    #[test]
    fn test_timeout_limits() {
        assert_eq!(30, Timeout::default().seconds());
        assert_eq!(Duration::from_secs(900), Timeout::new(900).unwrap().duration());
        Timeout::new(0).expect_err("zero timeout");
        Timeout::new(901).expect_err("timeout too long");
        assert_eq!(Timeout::new(60).unwrap(), "60".parse().unwrap());
    }

    #[test]
    fn test_template_spelling() {
        assert_eq!("x86_64", Architecture::X86_64.to_string());
        assert_eq!("arm64", Architecture::Arm64.to_string());
        assert_eq!("NONE", FunctionUrlAuthType::None.to_string());
        assert_eq!("*", HttpMethod::All.to_string());
        assert_eq!(HttpMethod::Post, "post".parse().unwrap());

        let json = serde_json::to_value(vec![HttpMethod::All, HttpMethod::Get]).unwrap();
        assert_eq!(serde_json::json!(["*", "GET"]), json);
    }
}
