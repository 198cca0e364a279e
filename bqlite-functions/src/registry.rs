//! Registers every scalar, aggregate, and window UDF into a host-engine
//! connection. Called once per connection open; the function set itself is
//! fixed at compile time, so there is nothing to build incrementally.

use crate::{aggregate, scalar, window};
use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use rusqlite::Result;

const FLAGS: FunctionFlags = FunctionFlags::SQLITE_UTF8;

macro_rules! scalar_fn {
    ($conn:expr, $name:expr, $nargs:expr, $f:path) => {
        $conn.create_scalar_function($name, $nargs, FLAGS, |ctx| $f(ctx))?;
    };
}

pub fn register_all(conn: &Connection) -> Result<()> {
    use scalar::{arithmetic as a, array_struct as ar, control as c, datetime as dt, hash as h, json as j, math as m, string as s};

    scalar_fn!(conn, "sys_add", 2, a::sys_add);
    scalar_fn!(conn, "sys_subtract", 2, a::sys_subtract);
    scalar_fn!(conn, "sys_multiply", 2, a::sys_multiply);
    scalar_fn!(conn, "sys_divide", 2, a::sys_divide);
    scalar_fn!(conn, "sys_equal", 2, a::sys_equal);
    scalar_fn!(conn, "sys_not_equal", 2, a::sys_not_equal);
    scalar_fn!(conn, "sys_greater", 2, a::sys_greater);
    scalar_fn!(conn, "sys_less", 2, a::sys_less);
    scalar_fn!(conn, "sys_greater_or_equal", 2, a::sys_greater_or_equal);
    scalar_fn!(conn, "sys_less_or_equal", 2, a::sys_less_or_equal);
    scalar_fn!(conn, "sys_and", 2, a::sys_and);
    scalar_fn!(conn, "sys_or", 2, a::sys_or);
    scalar_fn!(conn, "sys_not", 1, a::sys_not);
    scalar_fn!(conn, "sys_bitwise_and", 2, a::sys_bitwise_and);
    scalar_fn!(conn, "sys_bitwise_or", 2, a::sys_bitwise_or);
    scalar_fn!(conn, "sys_bitwise_xor", 2, a::sys_bitwise_xor);
    scalar_fn!(conn, "sys_bitwise_not", 1, a::sys_bitwise_not);
    scalar_fn!(conn, "sys_left_shift", 2, a::sys_left_shift);
    scalar_fn!(conn, "sys_right_shift", 2, a::sys_right_shift);

    scalar_fn!(conn, "sys_coalesce", -1, c::sys_coalesce);
    scalar_fn!(conn, "sys_nullif", 2, c::sys_nullif);

    scalar_fn!(conn, "sys_concat", -1, s::sys_concat);
    scalar_fn!(conn, "sys_substr", -1, s::sys_substr);
    scalar_fn!(conn, "sys_length", 1, s::sys_length);
    scalar_fn!(conn, "sys_upper", 1, s::sys_upper);
    scalar_fn!(conn, "sys_lower", 1, s::sys_lower);
    scalar_fn!(conn, "sys_lpad", -1, s::sys_lpad);
    scalar_fn!(conn, "sys_rpad", -1, s::sys_rpad);
    scalar_fn!(conn, "sys_trim", 1, s::sys_trim);
    scalar_fn!(conn, "sys_ltrim", 1, s::sys_ltrim);
    scalar_fn!(conn, "sys_rtrim", 1, s::sys_rtrim);
    scalar_fn!(conn, "sys_replace", 3, s::sys_replace);
    scalar_fn!(conn, "sys_regexp_contains", 2, s::sys_regexp_contains);
    scalar_fn!(conn, "sys_regexp_extract", 2, s::sys_regexp_extract);
    scalar_fn!(conn, "sys_regexp_replace", 3, s::sys_regexp_replace);
    scalar_fn!(conn, "sys_split", -1, s::sys_split);
    scalar_fn!(conn, "sys_strpos", 2, s::sys_strpos);
    scalar_fn!(conn, "sys_to_base64", 1, s::sys_to_base64);

    scalar_fn!(conn, "sys_abs", 1, m::sys_abs);
    scalar_fn!(conn, "sys_sign", 1, m::sys_sign);
    scalar_fn!(conn, "sys_is_nan", 1, m::sys_is_nan);
    scalar_fn!(conn, "sys_is_inf", 1, m::sys_is_inf);
    scalar_fn!(conn, "sys_ieee_divide", 2, m::sys_ieee_divide);
    scalar_fn!(conn, "sys_safe_divide", 2, m::sys_safe_divide);
    scalar_fn!(conn, "sys_sqrt", 1, m::sys_sqrt);
    scalar_fn!(conn, "sys_pow", 2, m::sys_pow);
    scalar_fn!(conn, "sys_exp", 1, m::sys_exp);
    scalar_fn!(conn, "sys_ln", 1, m::sys_ln);
    scalar_fn!(conn, "sys_log10", 1, m::sys_log10);
    scalar_fn!(conn, "sys_greatest", -1, m::sys_greatest);
    scalar_fn!(conn, "sys_least", -1, m::sys_least);
    scalar_fn!(conn, "sys_mod", 2, m::sys_mod);
    scalar_fn!(conn, "sys_div", 2, m::sys_div);
    scalar_fn!(conn, "sys_log", -1, m::sys_log);
    scalar_fn!(conn, "sys_round", -1, m::sys_round);
    scalar_fn!(conn, "sys_trunc", 1, m::sys_trunc);
    scalar_fn!(conn, "sys_ceil", 1, m::sys_ceil);
    scalar_fn!(conn, "sys_floor", 1, m::sys_floor);
    scalar_fn!(conn, "sys_cos", 1, m::sys_cos);
    scalar_fn!(conn, "sys_cosh", 1, m::sys_cosh);
    scalar_fn!(conn, "sys_acos", 1, m::sys_acos);
    scalar_fn!(conn, "sys_acosh", 1, m::sys_acosh);
    scalar_fn!(conn, "sys_sin", 1, m::sys_sin);
    scalar_fn!(conn, "sys_sinh", 1, m::sys_sinh);
    scalar_fn!(conn, "sys_asin", 1, m::sys_asin);
    scalar_fn!(conn, "sys_asinh", 1, m::sys_asinh);
    scalar_fn!(conn, "sys_tan", 1, m::sys_tan);
    scalar_fn!(conn, "sys_tanh", 1, m::sys_tanh);
    scalar_fn!(conn, "sys_atan", 1, m::sys_atan);
    scalar_fn!(conn, "sys_atanh", 1, m::sys_atanh);

    scalar_fn!(conn, "sys_current_date", -1, dt::sys_current_date);
    scalar_fn!(conn, "sys_current_timestamp", -1, dt::sys_current_timestamp);
    scalar_fn!(conn, "sys_current_datetime", -1, dt::sys_current_datetime);
    scalar_fn!(conn, "sys_date_add", 3, dt::sys_date_add);
    scalar_fn!(conn, "sys_date_sub", 3, dt::sys_date_sub);
    scalar_fn!(conn, "sys_date_diff", 3, dt::sys_date_diff);
    scalar_fn!(conn, "sys_date_trunc", 2, dt::sys_date_trunc);
    scalar_fn!(conn, "sys_extract", 2, dt::sys_extract);
    scalar_fn!(conn, "sys_last_day", 1, dt::sys_last_day);
    scalar_fn!(conn, "sys_date_from_unix_date", 1, dt::sys_date_from_unix_date);
    scalar_fn!(conn, "sys_unix_date", 1, dt::sys_unix_date);
    scalar_fn!(conn, "sys_timestamp_seconds", 1, dt::sys_timestamp_seconds);
    scalar_fn!(conn, "sys_timestamp_millis", 1, dt::sys_timestamp_millis);
    scalar_fn!(conn, "sys_timestamp_micros", 1, dt::sys_timestamp_micros);
    scalar_fn!(conn, "sys_unix_seconds", 1, dt::sys_unix_seconds);
    scalar_fn!(conn, "sys_unix_millis", 1, dt::sys_unix_millis);
    scalar_fn!(conn, "sys_unix_micros", 1, dt::sys_unix_micros);

    scalar_fn!(conn, "sys_cast", 3, ar::sys_cast);
    scalar_fn!(conn, "sys_make_struct", -1, ar::sys_make_struct);
    scalar_fn!(conn, "sys_get_struct_field", 2, ar::sys_get_struct_field);
    scalar_fn!(conn, "sys_array_length", 1, ar::sys_array_length);
    scalar_fn!(conn, "sys_array_at_offset", 2, ar::sys_array_at_offset);
    scalar_fn!(conn, "sys_array_at_ordinal", 2, ar::sys_array_at_ordinal);
    scalar_fn!(conn, "sys_array_concat", -1, ar::sys_array_concat);
    scalar_fn!(conn, "sys_array_reverse", 1, ar::sys_array_reverse);
    scalar_fn!(conn, "sys_array_to_string", 2, ar::sys_array_to_string);
    scalar_fn!(conn, "sys_generate_array", -1, ar::sys_generate_array);

    scalar_fn!(conn, "sys_to_json", 1, j::sys_to_json);
    scalar_fn!(conn, "sys_to_json_string", 1, j::sys_to_json_string);
    scalar_fn!(conn, "sys_json_type", 1, j::sys_json_type);
    scalar_fn!(conn, "sys_json_extract", 2, j::sys_json_extract);
    scalar_fn!(conn, "sys_json_extract_scalar", 2, j::sys_json_extract_scalar);

    scalar_fn!(conn, "sys_md5", 1, h::sys_md5);
    scalar_fn!(conn, "sys_sha1", 1, h::sys_sha1);
    scalar_fn!(conn, "sys_sha256", 1, h::sys_sha256);
    scalar_fn!(conn, "sys_sha512", 1, h::sys_sha512);
    scalar_fn!(conn, "sys_farm_fingerprint", 1, h::sys_farm_fingerprint);
    scalar_fn!(conn, "sys_generate_uuid", 0, h::sys_generate_uuid);

    aggregate::register_all(conn)?;
    window::register_all(conn)?;
    Ok(())
}
