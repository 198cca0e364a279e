//! Hash and UUID functions. All hash functions operate on the byte
//! representation: `BYTES` directly, `STRING` as UTF-8.

use crate::convert::{value_error_to_sql, ValueWrapper};
use bqlite_value::{Value, ValueError};
use rusqlite::functions::Context;
use rusqlite::Result;
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};

fn bytes(ctx: &Context, i: usize) -> Result<Option<Vec<u8>>> {
    match ctx.get::<ValueWrapper>(i)?.0 {
        Value::String(s) => Ok(Some(s.into_bytes())),
        Value::Bytes(b) => Ok(Some(b)),
        Value::Null => Ok(None),
        other => Err(value_error_to_sql(ValueError::type_error("hash fn", format!("expected STRING or BYTES, got {:?}", other.type_of())))),
    }
}

pub fn sys_md5(ctx: &Context) -> Result<ValueWrapper> {
    let Some(b) = bytes(ctx, 0)? else { return Ok(ValueWrapper(Value::Null)) };
    let mut hasher = Md5::new();
    hasher.update(&b);
    Ok(ValueWrapper(Value::Bytes(hasher.finalize().to_vec())))
}

pub fn sys_sha1(ctx: &Context) -> Result<ValueWrapper> {
    let Some(b) = bytes(ctx, 0)? else { return Ok(ValueWrapper(Value::Null)) };
    let mut hasher = Sha1::new();
    hasher.update(&b);
    Ok(ValueWrapper(Value::Bytes(hasher.finalize().to_vec())))
}

pub fn sys_sha256(ctx: &Context) -> Result<ValueWrapper> {
    let Some(b) = bytes(ctx, 0)? else { return Ok(ValueWrapper(Value::Null)) };
    let mut hasher = Sha256::new();
    hasher.update(&b);
    Ok(ValueWrapper(Value::Bytes(hasher.finalize().to_vec())))
}

pub fn sys_sha512(ctx: &Context) -> Result<ValueWrapper> {
    let Some(b) = bytes(ctx, 0)? else { return Ok(ValueWrapper(Value::Null)) };
    let mut hasher = Sha512::new();
    hasher.update(&b);
    Ok(ValueWrapper(Value::Bytes(hasher.finalize().to_vec())))
}

pub fn sys_farm_fingerprint(ctx: &Context) -> Result<ValueWrapper> {
    let Some(b) = bytes(ctx, 0)? else { return Ok(ValueWrapper(Value::Null)) };
    let mut hasher = Sha256::new();
    hasher.update(&b);
    let digest = hasher.finalize();
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&digest[0..8]);
    Ok(ValueWrapper(Value::Int(i64::from_le_bytes(buf))))
}

pub fn sys_generate_uuid(_ctx: &Context) -> Result<ValueWrapper> {
    Ok(ValueWrapper(Value::String(uuid::Uuid::new_v4().to_string())))
}
