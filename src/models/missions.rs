//! The static missions board. Nothing here is persisted.
use serde::Serialize;

use super::user::User;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Mission {
    pub id: u32,
    pub title: &'static str,
    pub description: &'static str,
    pub points: u32,
    pub progress: u32,
    pub target: u32,
    pub completed: bool,
    pub icon: &'static str,
}

impl Mission {
    /// Progress as a percentage, capped at 100.
    pub fn percent(&self) -> u32 {
        if self.target == 0 {
            return 100;
        }
        (self.progress * 100 / self.target).min(100)
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Badge {
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub earned: bool,
    pub color: &'static str,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub username: String,
    pub points: u32,
    pub avatar: String,
    pub crown: bool,
    pub is_current_user: bool,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MissionBoard {
    pub daily: Vec<Mission>,
    pub weekly: Vec<Mission>,
    pub badges: Vec<Badge>,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub total_points: u32,
    pub earned_badges: usize,
}

fn mission(
    id: u32,
    title: &'static str,
    description: &'static str,
    points: u32,
    (progress, target): (u32, u32),
    completed: bool,
    icon: &'static str,
) -> Mission {
    Mission {
        id,
        title,
        description,
        points,
        progress,
        target,
        completed,
        icon,
    }
}

fn ranked(rank: u32, username: &str, points: u32, avatar: &str, crown: bool) -> LeaderboardEntry {
    LeaderboardEntry {
        rank,
        username: username.to_string(),
        points,
        avatar: avatar.to_string(),
        crown,
        is_current_user: false,
    }
}

impl MissionBoard {
    pub fn for_user(user: &User) -> Self {
        let daily = vec![
            mission(1, "Post a lipstick swatch in red", "Share a swatch of a red lipstick product", 10, (2, 1), true, "💄"),
            mission(2, "Rate 3 products", "Rate at least 3 different products", 15, (1, 3), false, "⭐"),
            mission(3, "Write a detailed review", "Write a review with 200+ words", 20, (0, 1), false, "✍️"),
        ];
        let weekly = vec![
            mission(4, "Review a product under $20", "Find and review an affordable product", 25, (0, 1), false, "💰"),
            mission(5, "Upload 5 wear test photos", "Share photos showing product wear throughout the day", 50, (3, 5), false, "📸"),
            mission(6, "Discover 10 new products", "Browse and explore new products in the catalog", 30, (7, 10), false, "🔍"),
        ];
        let badges = vec![
            Badge { name: "Foundation Explorer", description: "Reviewed 10 foundations", icon: "🏆", earned: true, color: "gold" },
            Badge { name: "Lipstick Legend", description: "Expert in lip products", icon: "💋", earned: true, color: "red" },
            Badge { name: "Review Rockstar", description: "Write 50 reviews", icon: "⭐", earned: false, color: "purple" },
        ];

        let mut you = ranked(5, "You", 65, &user.initials(), false);
        you.is_current_user = true;
        let leaderboard = vec![
            ranked(1, "GlamQueen", 120, "GQ", true),
            ranked(2, "ShadeTwin", 90, "ST", false),
            ranked(3, "MakeupMaven", 85, "MM", false),
            ranked(4, "BeautyBoss", 78, "BB", false),
            you,
        ];

        let total_points = daily
            .iter()
            .chain(weekly.iter())
            .filter(|m| m.completed)
            .map(|m| m.points)
            .sum();
        let earned_badges = badges.iter().filter(|b| b.earned).count();

        Self {
            daily,
            weekly,
            badges,
            leaderboard,
            total_points,
            earned_badges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn board_totals_and_current_user_slot() {
        let user = User {
            id: 1,
            username: "lumi".into(),
            date_joined: Utc::now(),
        };
        let board = MissionBoard::for_user(&user);
        assert_eq!(board.total_points, 10);
        assert_eq!(board.earned_badges, 2);

        let me = &board.leaderboard[4];
        assert_eq!(me.rank, 5);
        assert!(me.is_current_user);
        assert_eq!(me.avatar, "LU");
        assert_eq!(board.daily[0].percent(), 100);
        assert_eq!(board.weekly[2].percent(), 70);
    }
}
