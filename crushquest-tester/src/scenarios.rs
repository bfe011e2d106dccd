use anyhow::{Context, Result, bail, ensure};

use crushquest_core::{
    AnswerMatching, FeedView, GameSession, ProfileStats, ReactionKind, ReactionOutcome,
    SessionError, SessionState, SubmitOutcome,
};

use crate::assets::TesterAssets;

pub type ScenarioCheck = fn(&TesterAssets) -> Result<()>;

#[derive(Debug, Clone, Copy)]
pub struct Scenario {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    check: ScenarioCheck,
}

impl Scenario {
    const fn new(
        key: &'static str,
        name: &'static str,
        description: &'static str,
        check: ScenarioCheck,
    ) -> Self {
        Self {
            key,
            name,
            description,
            check,
        }
    }

    /// # Errors
    ///
    /// Returns the first failed expectation.
    pub fn run(&self, assets: &TesterAssets) -> Result<()> {
        (self.check)(assets)
    }
}

const CATALOG: &[Scenario] = &[
    Scenario::new(
        "smoke",
        "Smoke Test",
        "Bundled data loads and every game can be started",
        smoke,
    ),
    Scenario::new(
        "this-or-that",
        "This or That Playthrough",
        "Answer all five This or That questions and verify the recorded answers",
        this_or_that,
    ),
    Scenario::new(
        "personality-match",
        "Personality Match Playthrough",
        "Play Personality Match with relaxed answer matching",
        personality_match,
    ),
    Scenario::new(
        "truth-or-dare",
        "Truth or Dare Playthrough",
        "Free-text answers advance and blank answers are rejected",
        truth_or_dare,
    ),
    Scenario::new(
        "cancel-restart",
        "Cancel and Restart",
        "Cancelling mid-game resets the session and a restart begins at question one",
        cancel_restart,
    ),
    Scenario::new(
        "invalid-answers",
        "Invalid Answers",
        "Answers outside the option set leave the session untouched",
        invalid_answers,
    ),
    Scenario::new(
        "feed-reactions",
        "Feed Reactions",
        "One reaction per post, blur toggling and newest-first ordering",
        feed_reactions,
    ),
    Scenario::new(
        "login-profile",
        "Login and Profile",
        "Mock login, profile statistics and logout",
        login_profile,
    ),
    Scenario::new(
        "match-quests",
        "Match Quests",
        "Quest acceptance and completion on the match board",
        match_quests,
    ),
];

pub fn all_scenarios() -> &'static [Scenario] {
    CATALOG
}

pub fn get_scenario(name: &str) -> Option<&'static Scenario> {
    let key = name.to_lowercase();
    CATALOG.iter().find(|scenario| scenario.key == key)
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    CATALOG
        .iter()
        .map(|scenario| (scenario.key, scenario.description))
        .collect()
}

fn play_through(session: &mut GameSession, answers: &[&str]) -> Result<()> {
    let total = answers.len();
    for (index, answer) in answers.iter().enumerate() {
        let outcome = session
            .submit_answer(answer)
            .with_context(|| format!("answer {} ({answer:?}) rejected", index + 1))?;
        let expected = if index + 1 == total {
            SubmitOutcome::Completed
        } else {
            SubmitOutcome::Advanced { index: index + 1 }
        };
        ensure!(
            outcome == expected,
            "unexpected outcome after answer {}: {outcome:?}",
            index + 1
        );
    }
    Ok(())
}

fn smoke(assets: &TesterAssets) -> Result<()> {
    let data = assets.data();
    ensure!(!data.games.is_empty(), "no games loaded");
    ensure!(!data.confessions.is_empty(), "no confessions loaded");
    ensure!(!data.users.is_empty(), "no users loaded");

    let app = assets.app();
    for game in &data.games {
        let mut session = app.new_session();
        app.start_game(&mut session, &game.id)?;
        ensure!(
            session.state() == SessionState::AwaitingAnswer { index: 0 },
            "{} did not start at the first question",
            game.id
        );
        ensure!(
            session.answers().is_empty(),
            "{} started with answers",
            game.id
        );
    }
    Ok(())
}

fn this_or_that(assets: &TesterAssets) -> Result<()> {
    let answers = ["Coffee", "Beach", "Movies", "Early Bird", "Pizza"];
    let app = assets.app();
    let mut session = app.new_session();
    app.start_game(&mut session, "game_001")?;
    play_through(&mut session, &answers)?;

    ensure!(session.state() == SessionState::Complete, "game not complete");
    ensure!(session.answers() == answers, "answers were not recorded in order");
    ensure!(
        session.submit_answer("Pasta").is_err(),
        "completed game accepted another answer"
    );

    let done = session
        .take_completed()
        .context("completed game could not be handed off")?;
    ensure!(done.game_id == "game_001", "wrong game handed off");
    ensure!(session.state() == SessionState::Idle, "hand-off did not reset");
    Ok(())
}

fn personality_match(assets: &TesterAssets) -> Result<()> {
    let app = assets.app();
    let mut session = GameSession::with_matching(AnswerMatching::CaseInsensitive);
    app.start_game(&mut session, "game_003")?;
    play_through(&mut session, &["introvert", "PLANNED", "Leader", "feeler"])?;
    ensure!(
        session.answers() == ["Introvert", "Planned", "Leader", "Feeler"],
        "canonical labels not recorded: {:?}",
        session.answers()
    );
    Ok(())
}

fn truth_or_dare(assets: &TesterAssets) -> Result<()> {
    let app = assets.app();
    let mut session = app.new_session();
    app.start_game(&mut session, "game_002")?;
    ensure!(
        session.current_options().is_empty(),
        "text game offered options"
    );

    match session.submit_answer("   ") {
        Err(SessionError::InvalidAnswer { .. }) => {}
        other => bail!("blank answer was not rejected: {other:?}"),
    }

    play_through(
        &mut session,
        &[
            "Tripped in front of them",
            "Sent 😂",
            "Picnic by the lake",
            "Posted it",
        ],
    )?;
    ensure!(session.state() == SessionState::Complete, "game not complete");
    Ok(())
}

fn cancel_restart(assets: &TesterAssets) -> Result<()> {
    let app = assets.app();
    let mut session = app.new_session();
    app.start_game(&mut session, "game_001")?;
    session.submit_answer("Tea")?;
    session.submit_answer("Mountain")?;
    session.cancel()?;
    ensure!(session.state() == SessionState::Idle, "cancel did not reset");
    ensure!(session.answers().is_empty(), "cancel kept answers");

    match session.cancel() {
        Err(SessionError::InvalidTransition { .. }) => {}
        other => bail!("cancel from idle should be rejected: {other:?}"),
    }

    app.start_game(&mut session, "game_001")?;
    let progress = session.progress().context("no progress after restart")?;
    ensure!(
        progress.to_string() == "Question 1 of 5",
        "restart began at {progress}"
    );
    Ok(())
}

fn invalid_answers(assets: &TesterAssets) -> Result<()> {
    let app = assets.app();
    let mut session = GameSession::with_matching(AnswerMatching::Exact);

    match session.submit_answer("Coffee") {
        Err(SessionError::InvalidTransition { .. }) => {}
        other => bail!("idle session accepted an answer: {other:?}"),
    }

    app.start_game(&mut session, "game_001")?;
    for rejected in ["Water", "coffee", "Coffee or Tea?", ""] {
        match session.submit_answer(rejected) {
            Err(SessionError::InvalidAnswer { .. }) => {}
            other => bail!("{rejected:?} was not rejected: {other:?}"),
        }
        ensure!(
            session.state() == SessionState::AwaitingAnswer { index: 0 },
            "rejected answer moved the session"
        );
        ensure!(session.answers().is_empty(), "rejected answer was recorded");
    }
    Ok(())
}

fn feed_reactions(assets: &TesterAssets) -> Result<()> {
    let app = assets.app();
    let mut feed = app.load_feed()?;
    ensure_newest_first(&feed)?;

    let post = feed
        .posts()
        .first()
        .context("feed is empty")?
        .clone();
    let before = post.reactions.count(ReactionKind::Heart);

    let first = feed.react(&post.id, ReactionKind::Heart)?;
    ensure!(
        first
            == ReactionOutcome::Accepted {
                kind: ReactionKind::Heart,
                count: before + 1
            },
        "first reaction not applied: {first:?}"
    );
    let total = |feed: &FeedView| -> u32 {
        feed.post(&post.id)
            .map(|p| p.reactions.iter().map(|(_, count)| count).sum())
            .unwrap_or(0)
    };
    let after_first = total(&feed);
    let second = feed.react(&post.id, ReactionKind::Laugh)?;
    ensure!(
        second == ReactionOutcome::AlreadyReacted,
        "second reaction was applied: {second:?}"
    );
    ensure!(
        total(&feed) == after_first,
        "repeat reaction changed the counts"
    );

    let blurred = feed.is_blurred(&post.id);
    let toggled = feed.toggle_blur(&post.id)?;
    ensure!(toggled != blurred, "blur did not toggle");

    ensure!(
        feed.react("post_missing", ReactionKind::Heart).is_err(),
        "unknown post accepted a reaction"
    );
    Ok(())
}

fn ensure_newest_first(feed: &FeedView) -> Result<()> {
    let ordered = feed
        .posts()
        .windows(2)
        .all(|pair| pair[0].timestamp >= pair[1].timestamp);
    ensure!(ordered, "feed is not ordered newest first");
    Ok(())
}

fn login_profile(assets: &TesterAssets) -> Result<()> {
    let app = assets.app();
    ensure!(
        app.profile_stats()?.is_none(),
        "profile available before login"
    );
    ensure!(
        app.login("aditi@usf.edu", "not-her-password").is_err(),
        "wrong password accepted"
    );

    let user = app.login("aditi@usf.edu", "aditi123")?;
    let stats = app
        .profile_stats()?
        .context("no profile after login")?;
    let expected = ProfileStats {
        total_matches: 2,
        total_posts: user.my_posts.len(),
        quests_completed: 1,
    };
    ensure!(stats == expected, "unexpected profile stats {stats:?}");

    app.logout()?;
    ensure!(app.current_user()?.is_none(), "logout kept the session");
    Ok(())
}

fn match_quests(assets: &TesterAssets) -> Result<()> {
    let app = assets.app();
    let mut board = app.match_board()?;
    let quest_id = "quest_002";
    let matched = board
        .match_mut("match_102")
        .context("match_102 missing")?;
    let (first, second) = (matched.user1.clone(), matched.user2.clone());

    ensure!(
        matched.accept_quest(quest_id, &second)?,
        "partner acceptance not recorded"
    );
    ensure!(
        !matched.accept_quest(quest_id, &first)?,
        "duplicate acceptance recorded"
    );
    ensure!(
        matched.accept_quest(quest_id, "user_999").is_err(),
        "outsider accepted a quest"
    );
    matched.complete_quest(quest_id)?;
    ensure!(matched.completed_quests() == 1, "quest not completed");

    let quest = assets
        .data()
        .quest(quest_id)
        .context("quest_002 missing from the catalog")?;
    ensure!(
        quest.task_for(matched, &second) == Some(quest.user2_task.as_str()),
        "partner was given the wrong task"
    );
    Ok(())
}
