use crate::domain::{
    BookFilter, BookInput, ClassificationDetailInput, ClassificationInput, DivisionInput,
    DomainError, NewUser,
};
use crate::infrastructure::AppState;

/// Creates the administrator account if no user with that name exists yet.
/// Returns whether a user was created.
pub async fn ensure_admin(
    state: &AppState,
    username: &str,
    password: &str,
) -> Result<bool, DomainError> {
    if state.user_repo.find_by_username(username).await?.is_some() {
        tracing::debug!("Admin user {} already exists", username);
        return Ok(false);
    }

    state
        .user_repo
        .create(NewUser {
            username: username.to_owned(),
            password: password.to_owned(),
            role: Some("admin".to_owned()),
        })
        .await?;
    tracing::info!("Bootstrapped admin user {}", username);
    Ok(true)
}

const CLASSIFICATIONS: &[(&str, &str)] = &[
    ("000", "General works"),
    ("400", "Natural sciences"),
    ("900", "Literature"),
];

const DETAILS: &[(&str, &str, &str)] = &[
    ("007", "000", "Information science"),
    ("440", "400", "Astronomy"),
    ("913", "900", "Japanese fiction"),
    ("933", "900", "English fiction"),
];

const DIVISIONS: &[(&str, &str)] = &[("01", "Main library"), ("02", "Branch library")];

/// Seeds a small catalog. Rows that already exist are left alone; books are
/// only added to an empty catalog.
pub async fn seed_demo_data(state: &AppState) -> Result<(), DomainError> {
    for (code, name) in CLASSIFICATIONS {
        if state.classification_repo.find_by_code(code).await?.is_none() {
            state
                .classification_repo
                .create(ClassificationInput {
                    code: (*code).to_owned(),
                    name: (*name).to_owned(),
                })
                .await?;
        }
    }

    for (code, parent, name) in DETAILS {
        if state
            .classification_detail_repo
            .find_by_code(code)
            .await?
            .is_none()
        {
            state
                .classification_detail_repo
                .create(ClassificationDetailInput {
                    code: (*code).to_owned(),
                    name: (*name).to_owned(),
                    classification: (*parent).to_owned(),
                })
                .await?;
        }
    }

    for (code, name) in DIVISIONS {
        if state.division_repo.find_by_code(code).await?.is_none() {
            state
                .division_repo
                .create(DivisionInput {
                    code: (*code).to_owned(),
                    name: (*name).to_owned(),
                })
                .await?;
        }
    }

    if state.book_repo.find_all(BookFilter::default()).await?.total > 0 {
        return Ok(());
    }

    let books = [
        ("Kokoro", Some("Natsume Soseki"), "913", "01"),
        ("Botchan", Some("Natsume Soseki"), "913", "02"),
        ("Cosmos", Some("Carl Sagan"), "440", "01"),
        ("Frankenstein", Some("Mary Shelley"), "933", "01"),
    ];
    for (title, author, detail, division) in books {
        state
            .book_repo
            .create(BookInput {
                title: title.to_owned(),
                author: author.map(str::to_owned),
                classification_detail: detail.to_owned(),
                division: division.to_owned(),
                ..Default::default()
            })
            .await?;
    }

    Ok(())
}
