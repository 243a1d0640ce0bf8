//! Giveaways.
//!
//! A giveaway is anchored to one message with an enter button. Entry is an
//! idempotent set-insert; the draw is a one-way, version-guarded transition
//! so exactly one request (deadline timer or an early `/gend`) selects the
//! winner set. Rerolls re-sample from participants who have not already won.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::seq::IndexedRandom;
use serenity::all::{ButtonStyle, ChannelId, CreateActionRow, CreateButton, GuildId, UserId};
use tracing::warn;

use crate::bot::router::{self, ComponentTarget};
use crate::data::{GiveawayRepository, StoreError};
use crate::error::AppError;
use crate::model::{decode_ids, encode_ids, GiveawayState};
use crate::scheduler::TimerKey;
use crate::service::{channel_id, CAS_RETRIES};
use crate::state::AppState;
use crate::sync::keys;

pub const MAX_WINNERS: i32 = 20;
pub const MIN_DURATION_SECS: i64 = 60;
pub const MAX_DURATION_SECS: i64 = 30 * 24 * 60 * 60;
const MAX_PRIZE_LEN: usize = 256;

pub enum EnterOutcome {
    Entered { total: usize },
    AlreadyEntered,
    /// The giveaway reached a terminal state before this click was handled.
    Ended,
}

pub enum DrawOutcome {
    Drawn { winners: Vec<String> },
    /// The draw already happened; carries the persisted winner set.
    AlreadyDrawn { winners: Vec<String> },
}

pub struct GiveawayService<'a> {
    state: &'a AppState,
}

impl<'a> GiveawayService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    fn repo(&self) -> GiveawayRepository<'a> {
        GiveawayRepository::new(&self.state.db)
    }

    /// Starts a giveaway: `pending` row, enter-button message, then the row
    /// is confirmed `active` and the end timer armed.
    pub async fn create(
        &self,
        guild: GuildId,
        channel: ChannelId,
        host: UserId,
        prize: &str,
        winner_count: i32,
        duration: ChronoDuration,
    ) -> Result<entity::giveaway::Model, AppError> {
        let prize = prize.trim();
        if prize.is_empty() || prize.len() > MAX_PRIZE_LEN {
            return Err(AppError::InvalidInput(format!(
                "The prize must be 1 to {MAX_PRIZE_LEN} characters."
            )));
        }
        if !(1..=MAX_WINNERS).contains(&winner_count) {
            return Err(AppError::InvalidInput(format!(
                "Winner count must be between 1 and {MAX_WINNERS}."
            )));
        }
        let secs = duration.num_seconds();
        if !(MIN_DURATION_SECS..=MAX_DURATION_SECS).contains(&secs) {
            return Err(AppError::InvalidInput(
                "Duration must be between 1 minute and 30 days.".to_string(),
            ));
        }

        let ends_at = Utc::now() + duration;
        let mut giveaway = self
            .repo()
            .create(
                &guild.to_string(),
                &channel.to_string(),
                &host.to_string(),
                prize,
                winner_count,
                ends_at,
            )
            .await?;

        let enter_id = router::giveaway_enter_id(giveaway.id);
        let button = CreateButton::new(enter_id.clone())
            .label("Enter")
            .emoji('🎉')
            .style(ButtonStyle::Primary);
        let content = announcement(prize, host, winner_count, ends_at);

        let message = match self
            .state
            .discord
            .send_message(channel, &content, vec![CreateActionRow::Buttons(vec![button])])
            .await
        {
            Ok(message) => message,
            Err(err) => {
                if let Err(cleanup) = self.repo().delete(giveaway.id).await {
                    warn!(giveaway = giveaway.id, %cleanup, "failed to drop pending giveaway");
                }
                return Err(err.into());
            }
        };

        giveaway.message_id = Some(message.to_string());
        giveaway.state = GiveawayState::Active.as_str().to_string();
        giveaway.bindings = encode_ids(std::slice::from_ref(&enter_id));
        let giveaway = self.repo().save(giveaway, 1).await?;

        self.state.bindings.register(
            &enter_id,
            ComponentTarget::GiveawayEnter { giveaway_id: giveaway.id },
        );
        self.state
            .scheduler
            .arm(TimerKey::GiveawayEnd { giveaway_id: giveaway.id }, ends_at);

        Ok(giveaway)
    }

    /// Adds `user` to the participant set. A second click is a no-op, and a
    /// click landing after the draw reports `Ended` instead of failing.
    pub async fn enter(&self, giveaway_id: i32, user: UserId) -> Result<EnterOutcome, AppError> {
        self.state
            .guard
            .with_lock(&keys::giveaway(giveaway_id), async {
                for _ in 0..CAS_RETRIES {
                    let Some(mut giveaway) = self.repo().load(giveaway_id).await? else {
                        return Err(AppError::NotFound(
                            "This giveaway no longer exists.".to_string(),
                        ));
                    };
                    if GiveawayState::parse(&giveaway.state) != Some(GiveawayState::Active) {
                        return Ok(EnterOutcome::Ended);
                    }

                    let mut participants = decode_ids(&giveaway.participants);
                    let user_key = user.to_string();
                    if participants.contains(&user_key) {
                        return Ok(EnterOutcome::AlreadyEntered);
                    }
                    participants.push(user_key);
                    let total = participants.len();

                    let expected = giveaway.version;
                    giveaway.participants = encode_ids(&participants);
                    match self.repo().save(giveaway, expected).await {
                        Ok(_) => return Ok(EnterOutcome::Entered { total }),
                        Err(StoreError::VersionConflict { .. }) => continue,
                        Err(err) => return Err(err.into()),
                    }
                }

                Err(AppError::InternalError(format!(
                    "giveaway {giveaway_id} kept conflicting during entry"
                )))
            })
            .await
    }

    /// Removes `user` from the participant set. Returns `false` if they were
    /// not entered.
    pub async fn leave(&self, giveaway_id: i32, user: UserId) -> Result<bool, AppError> {
        self.state
            .guard
            .with_lock(&keys::giveaway(giveaway_id), async {
                for _ in 0..CAS_RETRIES {
                    let Some(mut giveaway) = self.repo().load(giveaway_id).await? else {
                        return Err(AppError::NotFound(
                            "This giveaway no longer exists.".to_string(),
                        ));
                    };
                    if GiveawayState::parse(&giveaway.state) != Some(GiveawayState::Active) {
                        return Ok(false);
                    }

                    let participants = decode_ids(&giveaway.participants);
                    let user_key = user.to_string();
                    if !participants.contains(&user_key) {
                        return Ok(false);
                    }
                    let remaining: Vec<String> =
                        participants.into_iter().filter(|p| *p != user_key).collect();

                    let expected = giveaway.version;
                    giveaway.participants = encode_ids(&remaining);
                    match self.repo().save(giveaway, expected).await {
                        Ok(_) => return Ok(true),
                        Err(StoreError::VersionConflict { .. }) => continue,
                        Err(err) => return Err(err.into()),
                    }
                }

                Err(AppError::InternalError(format!(
                    "giveaway {giveaway_id} kept conflicting during withdrawal"
                )))
            })
            .await
    }

    /// One-shot draw. Whichever caller wins the version-guarded transition
    /// persists the winner set; everyone else observes `AlreadyDrawn`. If
    /// fewer participants than requested winners entered, everyone wins.
    pub async fn draw(&self, giveaway_id: i32) -> Result<DrawOutcome, AppError> {
        self.state
            .guard
            .with_lock(&keys::giveaway(giveaway_id), async {
                for _ in 0..CAS_RETRIES {
                    let Some(mut giveaway) = self.repo().load(giveaway_id).await? else {
                        return Err(AppError::NotFound(
                            "This giveaway no longer exists.".to_string(),
                        ));
                    };
                    match GiveawayState::parse(&giveaway.state) {
                        Some(GiveawayState::Drawn) => {
                            return Ok(DrawOutcome::AlreadyDrawn {
                                winners: decode_ids(&giveaway.winners),
                            })
                        }
                        Some(GiveawayState::Active) => {}
                        _ => {
                            return Err(AppError::NotFound(
                                "This giveaway no longer exists.".to_string(),
                            ))
                        }
                    }

                    let participants = decode_ids(&giveaway.participants);
                    let winners = sample(&participants, giveaway.winner_count as usize, &[]);

                    let expected = giveaway.version;
                    giveaway.state = GiveawayState::Drawn.as_str().to_string();
                    giveaway.winners = encode_ids(&winners);
                    giveaway.expires_at = None;
                    giveaway.bindings = encode_ids(&[]);
                    match self.repo().save(giveaway, expected).await {
                        Ok(drawn) => {
                            self.finish_draw(&drawn, &winners).await;
                            return Ok(DrawOutcome::Drawn { winners });
                        }
                        Err(StoreError::VersionConflict { .. }) => continue,
                        Err(err) => return Err(err.into()),
                    }
                }

                Err(AppError::InternalError(format!(
                    "giveaway {giveaway_id} kept conflicting during draw"
                )))
            })
            .await
    }

    /// Picks replacement winners from participants who have not won yet and
    /// appends them to the persisted winner set.
    pub async fn reroll(&self, giveaway_id: i32) -> Result<Vec<String>, AppError> {
        self.state
            .guard
            .with_lock(&keys::giveaway(giveaway_id), async {
                for _ in 0..CAS_RETRIES {
                    let Some(mut giveaway) = self.repo().load(giveaway_id).await? else {
                        return Err(AppError::NotFound(
                            "This giveaway no longer exists.".to_string(),
                        ));
                    };
                    if GiveawayState::parse(&giveaway.state) != Some(GiveawayState::Drawn) {
                        return Err(AppError::InvalidInput(
                            "That giveaway has not ended yet.".to_string(),
                        ));
                    }

                    let participants = decode_ids(&giveaway.participants);
                    let mut winners = decode_ids(&giveaway.winners);
                    let fresh = sample(&participants, giveaway.winner_count as usize, &winners);
                    if fresh.is_empty() {
                        return Err(AppError::InsufficientParticipants);
                    }
                    winners.extend(fresh.iter().cloned());

                    let expected = giveaway.version;
                    giveaway.winners = encode_ids(&winners);
                    match self.repo().save(giveaway, expected).await {
                        Ok(saved) => {
                            self.announce_winners(&saved, &fresh, true).await;
                            return Ok(fresh);
                        }
                        Err(StoreError::VersionConflict { .. }) => continue,
                        Err(err) => return Err(err.into()),
                    }
                }

                Err(AppError::InternalError(format!(
                    "giveaway {giveaway_id} kept conflicting during reroll"
                )))
            })
            .await
    }

    /// `/gend`: draws the active giveaway in `channel` ahead of schedule.
    pub async fn end_now(
        &self,
        guild: GuildId,
        channel: ChannelId,
    ) -> Result<DrawOutcome, AppError> {
        let Some(giveaway) = self
            .repo()
            .find_active_by_channel(&guild.to_string(), &channel.to_string())
            .await?
        else {
            return Err(AppError::NotFound(
                "There is no active giveaway in this channel.".to_string(),
            ));
        };
        self.draw(giveaway.id).await
    }

    /// `/greroll`: rerolls the guild's most recently drawn giveaway.
    pub async fn reroll_latest(&self, guild: GuildId) -> Result<Vec<String>, AppError> {
        let Some(giveaway) = self.repo().find_latest_drawn(&guild.to_string()).await? else {
            return Err(AppError::NotFound(
                "There is no ended giveaway on this server.".to_string(),
            ));
        };
        self.reroll(giveaway.id).await
    }

    /// Deadline timer callback. A giveaway drawn early is a quiet no-op.
    pub async fn on_deadline(&self, giveaway_id: i32) -> Result<(), AppError> {
        match self.draw(giveaway_id).await {
            Ok(_) => Ok(()),
            // Orphaned or deleted between arming and firing.
            Err(AppError::NotFound(_)) => Ok(()),
            Err(err) => Err(err),
        }
    }

    async fn finish_draw(&self, giveaway: &entity::giveaway::Model, winners: &[String]) {
        self.state
            .bindings
            .unregister(&router::giveaway_enter_id(giveaway.id));
        self.state
            .scheduler
            .cancel(TimerKey::GiveawayEnd { giveaway_id: giveaway.id });

        // Strip the enter button from the announcement message.
        if let (Ok(channel), Some(message)) = (
            channel_id(&giveaway.channel_id),
            giveaway
                .message_id
                .as_deref()
                .and_then(|m| m.parse::<u64>().ok())
                .map(serenity::all::MessageId::new),
        ) {
            if let Err(err) = self
                .state
                .discord
                .edit_message_components(channel, message, vec![])
                .await
            {
                warn!(giveaway = giveaway.id, %err, "failed to disable enter button");
            }
        }

        self.announce_winners(giveaway, winners, false).await;
    }

    async fn announce_winners(
        &self,
        giveaway: &entity::giveaway::Model,
        winners: &[String],
        reroll: bool,
    ) {
        let Ok(channel) = channel_id(&giveaway.channel_id) else {
            warn!(giveaway = giveaway.id, "bad channel id on announcement");
            return;
        };

        let content = if winners.is_empty() {
            format!("No one entered the giveaway for **{}**.", giveaway.prize)
        } else {
            let mentions: Vec<String> = winners.iter().map(|w| format!("<@{w}>")).collect();
            if reroll {
                format!(
                    "🎉 New winner{} for **{}**: {}",
                    if winners.len() == 1 { "" } else { "s" },
                    giveaway.prize,
                    mentions.join(", ")
                )
            } else {
                format!(
                    "🎉 Congratulations {}! You won **{}**!",
                    mentions.join(", "),
                    giveaway.prize
                )
            }
        };

        if let Err(err) = self.state.discord.send_message(channel, &content, vec![]).await {
            warn!(giveaway = giveaway.id, %err, "failed to announce winners");
        }
    }
}

fn announcement(prize: &str, host: UserId, winner_count: i32, ends_at: DateTime<Utc>) -> String {
    format!(
        "🎉 **{prize}**\nHosted by <@{host}>\nWinners: {winner_count}\nEnds <t:{}:R>",
        ends_at.timestamp()
    )
}

/// Samples up to `count` distinct entries from `pool`, skipping anything in
/// `exclude`. Returns the whole eligible pool when it is smaller than
/// `count`.
fn sample(pool: &[String], count: usize, exclude: &[String]) -> Vec<String> {
    let eligible: Vec<&String> = pool.iter().filter(|p| !exclude.contains(p)).collect();
    let mut rng = rand::rng();
    eligible
        .choose_multiple(&mut rng, count.min(eligible.len()))
        .map(|s| (*s).clone())
        .collect()
}

/// Parses a human duration like `30m`, `2h`, `7d`, or plain seconds.
pub fn parse_duration(input: &str) -> Option<ChronoDuration> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let (digits, unit) = match input.char_indices().find(|(_, c)| !c.is_ascii_digit()) {
        Some((split, _)) => input.split_at(split),
        None => (input, "s"),
    };
    let amount: i64 = digits.parse().ok()?;

    let seconds = match unit.trim() {
        "s" | "sec" | "secs" => amount,
        "m" | "min" | "mins" => amount.checked_mul(60)?,
        "h" | "hr" | "hrs" => amount.checked_mul(60 * 60)?,
        "d" | "day" | "days" => amount.checked_mul(24 * 60 * 60)?,
        _ => return None,
    };
    Some(ChronoDuration::seconds(seconds))
}
