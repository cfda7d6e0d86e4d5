//! GraphQL documents issued by the dashboard

pub const USER_QUERY: &str = r#"
query GetCurrentUser {
    user {
        id
        login
        attrs
        totalUp
        totalDown
        createdAt
        updatedAt
    }
}"#;

pub const TOTAL_XP_QUERY: &str = r#"
query GetUserXPTotal {
    transaction_aggregate(where: { type: { _eq: "xp" } }) {
        aggregate {
            sum {
                amount
            }
        }
    }
}"#;

pub const TRANSACTIONS_QUERY: &str = r#"
query GetUserTransactions {
    transaction(order_by: { createdAt: desc }) {
        id
        type
        amount
        createdAt
        path
        object {
            id
            name
            type
        }
    }
}"#;

pub const PROGRESS_QUERY: &str = r#"
query GetUserProgress {
    progress(
        order_by: { createdAt: desc }
        where: { object: { type: { _eq: "project" } } }
    ) {
        id
        grade
        createdAt
        updatedAt
        path
        object {
            id
            name
            type
            attrs
        }
    }
}"#;

/// Takes `$eventIds: [Int!]`
pub const LEVEL_EVENTS_QUERY: &str = r#"
query GetLevelDistribution($eventIds: [Int!]) {
    event_user(where: { eventId: { _in: $eventIds } }) {
        level
        userId
        userLogin
        eventId
    }
}"#;
