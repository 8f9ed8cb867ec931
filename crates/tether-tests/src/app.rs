#![allow(clippy::unused_async)]

use serde::{Deserialize, Serialize, Serializer, ser};
use std::time::Duration;
use tether_core::{
    Context, Error,
    raw::{Request, ResponseWriter},
};

///
/// Greeting
///

#[derive(Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Greeting {
    pub message: String,
}

pub async fn greet(_ctx: Context, name: String) -> Result<Greeting, Error> {
    match name.as_str() {
        "boom" => panic!("boom"),
        "nobody" => Err(Error::not_found("no such person")),
        _ => Ok(Greeting {
            message: format!("hello {name}"),
        }),
    }
}

pub async fn get_item(_ctx: Context, id: i64) -> Result<(), Error> {
    if id < 0 {
        return Err(Error::invalid_argument("negative id"));
    }

    Ok(())
}

pub async fn ping(_ctx: Context) -> Result<(), Error> {
    Ok(())
}

pub async fn whoami(ctx: Context) -> Result<String, Error> {
    Ok(ctx.uid().unwrap_or_default().to_string())
}

///
/// Range
/// Serializes any bounds but only decodes ordered ones.
///

#[derive(Debug, Deserialize, Serialize)]
#[serde(try_from = "RangeRepr")]
pub struct Range {
    pub lo: u32,
    pub hi: u32,
}

#[derive(Deserialize)]
struct RangeRepr {
    lo: u32,
    hi: u32,
}

impl TryFrom<RangeRepr> for Range {
    type Error = String;

    fn try_from(r: RangeRepr) -> Result<Self, String> {
        if r.lo > r.hi {
            return Err(format!("{} > {}", r.lo, r.hi));
        }

        Ok(Self { lo: r.lo, hi: r.hi })
    }
}

pub async fn width(_ctx: Context, range: Range) -> Result<u32, Error> {
    Ok(range.hi - range.lo)
}

///
/// Sealed
/// Decodes normally but refuses to be serialized.
///

#[derive(Debug, Deserialize)]
pub struct Sealed {
    pub secret: String,
}

impl Serialize for Sealed {
    fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
        Err(ser::Error::custom("sealed value"))
    }
}

pub async fn peek(_ctx: Context) -> Result<Sealed, Error> {
    Ok(Sealed {
        secret: "hunter2".to_string(),
    })
}

/// Sleeps long enough for callers to give up first.
pub const WAIT: Duration = Duration::from_millis(300);

pub async fn wait(_ctx: Context) -> Result<(), Error> {
    tokio::time::sleep(WAIT).await;

    Ok(())
}

/// Service-to-service call from inside a handler.
pub async fn forward(ctx: Context) -> Result<(), Error> {
    crate::wrappers::__encore_Health_Ping(ctx).await
}

pub async fn serve(w: &mut dyn ResponseWriter, req: Request) {
    match req.path() {
        "/files/missing" => {
            w.write_header(404);
            let _ = w.write(b"not found");
        }
        "/files/moved" => w.write_header(301),
        "/files/crash" => panic!("disk on fire"),
        _ => {
            let _ = w.write(b"contents");
        }
    }
}
