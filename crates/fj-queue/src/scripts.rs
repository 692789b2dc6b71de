// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lua scripts run server-side so the reap-then-claim and nack-or-deadletter
//! sequences are atomic with respect to other consumers in the group.

/// KEYS[1] = pending list, KEYS[2] = processing zset, KEYS[3] = job hash
/// prefix (queue-scoped, job id appended in-script)
/// ARGV[1] = now (epoch ms), ARGV[2] = visibility deadline (epoch ms),
/// ARGV[3] = job hash key prefix (e.g. "fj:bulk_search:job:")
///
/// First reaps any processing entries whose deadline has passed back
/// onto the tail of pending (the "reaper"), then claims the oldest
/// pending job, if any, installing a fresh visibility deadline and
/// bumping its attempt counter. Returns the claimed job id, or false
/// when pending is empty after reaping.
pub const DEQUEUE_SCRIPT: &str = r#"
local pending = KEYS[1]
local processing = KEYS[2]
local now = tonumber(ARGV[1])
local deadline = ARGV[2]
local job_prefix = ARGV[3]

local expired = redis.call('ZRANGEBYSCORE', processing, '-inf', now)
for _, job_id in ipairs(expired) do
    redis.call('ZREM', processing, job_id)
    redis.call('RPUSH', pending, job_id)
end

local job_id = redis.call('LPOP', pending)
if not job_id then
    return false
end

redis.call('ZADD', processing, deadline, job_id)
redis.call('HINCRBY', job_prefix .. job_id, 'attempts', 1)
return job_id
"#;

/// KEYS[1] = processing zset, KEYS[2] = pending list, KEYS[3] = dead list
/// ARGV[1] = job id, ARGV[2] = max attempts, ARGV[3] = job hash key
///
/// Removes the job from processing; if its attempt count is still under
/// the limit it goes back to pending, otherwise to the dead-letter list.
pub const NACK_SCRIPT: &str = r#"
local processing = KEYS[1]
local pending = KEYS[2]
local dead = KEYS[3]
local job_id = ARGV[1]
local max_attempts = tonumber(ARGV[2])
local job_key = ARGV[3]

redis.call('ZREM', processing, job_id)

local attempts = tonumber(redis.call('HGET', job_key, 'attempts') or '0')
if attempts >= max_attempts then
    redis.call('RPUSH', dead, job_id)
    return 'dead'
else
    redis.call('RPUSH', pending, job_id)
    return 'pending'
end
"#;

/// KEYS[1] = processing zset, ARGV[1] = job id
/// Acking is idempotent: removing an absent member is a no-op in Redis.
pub const ACK_SCRIPT: &str = r#"
local processing = KEYS[1]
local job_id = ARGV[1]
redis.call('ZREM', processing, job_id)
return 1
"#;
