//! Initial store contents
//!
//! The demonstration data set mirrors a small branch library: eight titles,
//! their copies, six borrowers plus the member behind the demo account, a
//! few loans in every state and a short activity journal. Dates are laid out
//! relative to `today` so overdue and expired items stay overdue and expired
//! whenever the server starts.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use once_cell::sync::OnceCell;

use crate::{
    config::AuthConfig,
    error::AppResult,
    models::{
        Activity, ActivityKind, Book, BookCopy, CopyStatus, Loan, LoanStatus, Member, MemberStatus,
        MembershipType, Reservation, ReservationStatus, Role, User,
    },
    services::auth::hash_password,
};

use super::LibraryData;

/// Demo accounts: (id, email, password, name, role, phone, address, joined, member)
const DEMO_ACCOUNTS: [(&str, &str, &str, &str, Role, &str, &str, (i32, u32, u32), Option<&str>); 3] = [
    (
        "usr-001",
        "admin@library.com",
        "admin123",
        "Arnab Administrator",
        Role::Admin,
        "+1 (555) 100-0001",
        "100 Admin Street, Library City",
        (2020, 1, 15),
        None,
    ),
    (
        "usr-002",
        "librarian@library.com",
        "lib123",
        "Sarah Librarian",
        Role::Librarian,
        "+1 (555) 200-0002",
        "200 Librarian Lane, Book Town",
        (2021, 3, 20),
        None,
    ),
    (
        "usr-003",
        "member@library.com",
        "member123",
        "Mike Member",
        Role::Member,
        "+1 (555) 300-0003",
        "300 Reader Road, Story Village",
        (2023, 6, 10),
        Some("mem-007"),
    ),
];

/// Argon2 is slow on purpose; hash the demo passwords once per process.
static DEMO_PASSWORD_HASHES: OnceCell<Vec<String>> = OnceCell::new();

fn demo_password_hashes() -> AppResult<&'static Vec<String>> {
    DEMO_PASSWORD_HASHES.get_or_try_init(|| {
        DEMO_ACCOUNTS
            .iter()
            .map(|account| hash_password(account.2))
            .collect()
    })
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

/// Full demonstration data set
pub fn demo_data(today: NaiveDate, now: DateTime<Utc>) -> AppResult<LibraryData> {
    let day = |offset: i64| today + Duration::days(offset);
    let hashes = demo_password_hashes()?;

    let users = DEMO_ACCOUNTS
        .iter()
        .zip(hashes.iter())
        .map(
            |(&(id, email, _, name, role, phone, address, (y, m, d), member_id), hash)| User {
                id: id.to_string(),
                email: email.to_string(),
                name: name.to_string(),
                role,
                phone: Some(phone.to_string()),
                address: Some(address.to_string()),
                membership_date: Some(date(y, m, d)),
                member_id: member_id.map(str::to_string),
                password_hash: hash.clone(),
            },
        )
        .collect();

    let books = vec![
        book("book-001", "978-0-06-112008-4", "To Kill a Mockingbird", "Harper Lee", "J. B. Lippincott & Co.", 1960, "Fiction",
            "A novel about racial injustice and moral growth in the American South.",
            "https://images.unsplash.com/photo-1544947950-fa07a98d237f?w=300&h=400&fit=crop"),
        book("book-002", "978-0-452-28423-4", "1984", "George Orwell", "Secker & Warburg", 1949, "Dystopian",
            "A dystopian social science fiction novel about totalitarianism.",
            "https://images.unsplash.com/photo-1543002588-bfa74002ed7e?w=300&h=400&fit=crop"),
        book("book-003", "978-0-7432-7356-5", "The Great Gatsby", "F. Scott Fitzgerald", "Charles Scribner's Sons", 1925, "Classic",
            "A novel about the American Dream during the Roaring Twenties.",
            "https://images.unsplash.com/photo-1589998059171-988d887df646?w=300&h=400&fit=crop"),
        book("book-004", "978-0-316-76948-0", "The Catcher in the Rye", "J.D. Salinger", "Little, Brown and Company", 1951, "Fiction",
            "A story about teenage angst and alienation.",
            "https://images.unsplash.com/photo-1512820790803-83ca734da794?w=300&h=400&fit=crop"),
        book("book-005", "978-0-14-028329-7", "Pride and Prejudice", "Jane Austen", "T. Egerton, Whitehall", 1813, "Romance",
            "A romantic novel that charts the emotional development of Elizabeth Bennet.",
            "https://images.unsplash.com/photo-1481627834876-b7833e8f5570?w=300&h=400&fit=crop"),
        book("book-006", "978-0-06-093546-7", "To Kill a Kingdom", "Alexandra Christo", "Feiwel & Friends", 2018, "Fantasy",
            "A dark and romantic fantasy about sirens and pirates.",
            "https://images.unsplash.com/photo-1495446815901-a7297e633e8d?w=300&h=400&fit=crop"),
        book("book-007", "978-0-385-33348-1", "The Hobbit", "J.R.R. Tolkien", "George Allen & Unwin", 1937, "Fantasy",
            "A fantasy novel about the adventures of Bilbo Baggins.",
            "https://images.unsplash.com/photo-1507842217343-583bb7270b66?w=300&h=400&fit=crop"),
        book("book-008", "978-0-14-028329-8", "The Art of War", "Sun Tzu", "Various", -500, "Philosophy",
            "An ancient Chinese military treatise on warfare and strategy.",
            "https://images.unsplash.com/photo-1524995997946-a1c2e315a42f?w=300&h=400&fit=crop"),
    ];

    use CopyStatus::*;
    let copy_rows: [(&str, &str, &str, CopyStatus, &str, NaiveDate); 32] = [
        ("copy-001", "book-001", "TKM-001", Available, "Shelf A1", date(2022, 1, 15)),
        ("copy-002", "book-001", "TKM-002", Issued, "Shelf A1", date(2022, 1, 15)),
        ("copy-003", "book-001", "TKM-003", Available, "Shelf A1", date(2022, 3, 20)),
        ("copy-004", "book-001", "TKM-004", Reserved, "Shelf A1", date(2022, 6, 10)),
        ("copy-005", "book-001", "TKM-005", Available, "Shelf A2", date(2023, 1, 5)),
        ("copy-006", "book-002", "1984-001", Available, "Shelf B1", date(2022, 2, 10)),
        ("copy-007", "book-002", "1984-002", Issued, "Shelf B1", date(2022, 2, 10)),
        ("copy-008", "book-002", "1984-003", Issued, "Shelf B1", date(2022, 5, 15)),
        ("copy-009", "book-002", "1984-004", Available, "Shelf B2", date(2023, 2, 20)),
        ("copy-010", "book-003", "GG-001", Available, "Shelf C1", date(2022, 3, 1)),
        ("copy-011", "book-003", "GG-002", Issued, "Shelf C1", date(2022, 3, 1)),
        ("copy-012", "book-003", "GG-003", Damaged, "Repair", date(2022, 4, 15)),
        ("copy-013", "book-004", "CR-001", Available, "Shelf A3", date(2022, 2, 1)),
        ("copy-014", "book-004", "CR-002", Available, "Shelf A3", date(2022, 2, 1)),
        ("copy-015", "book-004", "CR-003", Available, "Shelf A3", date(2022, 9, 12)),
        ("copy-016", "book-004", "CR-004", Available, "Shelf A3", date(2023, 4, 2)),
        ("copy-017", "book-005", "PP-001", Available, "Shelf D1", date(2021, 11, 3)),
        ("copy-018", "book-005", "PP-002", Available, "Shelf D1", date(2021, 11, 3)),
        ("copy-019", "book-005", "PP-003", Available, "Shelf D1", date(2022, 1, 20)),
        ("copy-020", "book-005", "PP-004", Available, "Shelf D1", date(2022, 7, 8)),
        ("copy-021", "book-005", "PP-005", Available, "Shelf D2", date(2023, 3, 14)),
        ("copy-022", "book-005", "PP-006", Lost, "Unknown", date(2023, 3, 14)),
        ("copy-023", "book-006", "TKK-001", Available, "Shelf E1", date(2022, 5, 30)),
        ("copy-024", "book-006", "TKK-002", Available, "Shelf E1", date(2022, 5, 30)),
        ("copy-025", "book-006", "TKK-003", Reserved, "Hold Shelf", date(2023, 8, 19)),
        ("copy-026", "book-007", "HOB-001", Available, "Shelf E2", date(2021, 9, 1)),
        ("copy-027", "book-007", "HOB-002", Available, "Shelf E2", date(2021, 9, 1)),
        ("copy-028", "book-007", "HOB-003", Available, "Shelf E2", date(2022, 10, 11)),
        ("copy-029", "book-007", "HOB-004", Damaged, "Repair", date(2022, 10, 11)),
        ("copy-030", "book-007", "HOB-005", Lost, "Unknown", date(2023, 5, 6)),
        ("copy-031", "book-008", "AOW-001", Available, "Shelf F1", date(2022, 6, 1)),
        ("copy-032", "book-008", "AOW-002", Available, "Shelf F1", date(2022, 6, 1)),
    ];
    let copies = copy_rows
        .iter()
        .map(|&(id, book_id, number, status, location, added)| BookCopy {
            id: id.to_string(),
            book_id: book_id.to_string(),
            copy_number: number.to_string(),
            status,
            location: location.to_string(),
            added_date: added,
        })
        .collect();

    let members = vec![
        member("mem-001", "Alice Johnson", "alice.johnson@email.com", "+1 (555) 111-1111", "123 Oak Street, Springfield",
            date(2022, 1, 10), MembershipType::Premium, MemberStatus::Active, None),
        member("mem-002", "Bob Smith", "bob.smith@email.com", "+1 (555) 222-2222", "456 Maple Avenue, Riverdale",
            date(2022, 3, 15), MembershipType::Standard, MemberStatus::Active, None),
        member("mem-003", "Carol Williams", "carol.w@university.edu", "+1 (555) 333-3333", "789 Pine Road, Collegetown",
            date(2023, 9, 1), MembershipType::Student, MemberStatus::Active, None),
        member("mem-004", "David Brown", "david.brown@email.com", "+1 (555) 444-4444", "321 Elm Street, Lakewood",
            date(2021, 6, 20), MembershipType::Premium, MemberStatus::Active, None),
        member("mem-005", "Emma Davis", "emma.davis@email.com", "+1 (555) 555-5555", "654 Cedar Lane, Hillside",
            date(2023, 1, 5), MembershipType::Standard, MemberStatus::Suspended, None),
        member("mem-006", "Frank Miller", "frank.m@email.com", "+1 (555) 666-6666", "987 Birch Boulevard, Westside",
            date(2020, 11, 10), MembershipType::Premium, MemberStatus::Expired, None),
        member("mem-007", "Mike Member", "member@library.com", "+1 (555) 300-0003", "300 Reader Road, Story Village",
            date(2023, 6, 10), MembershipType::Standard, MemberStatus::Active, Some("usr-003")),
    ];

    let loans = vec![
        loan("loan-001", "copy-002", "book-001", "mem-001", day(-30), day(-16), None),
        loan("loan-002", "copy-007", "book-002", "mem-001", day(-11), day(3), None),
        loan("loan-003", "copy-008", "book-002", "mem-002", day(-6), day(8), None),
        loan("loan-004", "copy-011", "book-003", "mem-003", day(-21), day(-7), None),
        loan("loan-005", "copy-001", "book-001", "mem-003", day(-61), day(-47), Some(day(-48))),
        loan("loan-006", "copy-006", "book-002", "mem-004", day(-77), day(-63), Some(day(-64))),
        loan("loan-007", "copy-017", "book-005", "mem-001", day(-14), day(0), Some(day(-5))),
    ];

    let reservations = vec![
        reservation("res-001", "book-001", "mem-002", day(-3), day(4), ReservationStatus::Pending),
        reservation("res-002", "book-006", "mem-004", day(-6), day(1), ReservationStatus::Pending),
        reservation("res-003", "book-002", "mem-003", day(-11), day(-4), ReservationStatus::Pending),
        Reservation {
            loan_id: Some("loan-007".to_string()),
            ..reservation("res-004", "book-005", "mem-001", day(-16), day(-9), ReservationStatus::Fulfilled)
        },
    ];

    let hours_ago = |h: i64| now - Duration::hours(h);
    let activity = vec![
        entry("act-005", ActivityKind::Issue, "David Brown borrowed \"The Art of War\"", hours_ago(25)),
        entry("act-004", ActivityKind::NewMember, "New member registered: Emma Davis", hours_ago(21)),
        entry("act-003", ActivityKind::Reservation, "Carol Williams reserved \"Pride and Prejudice\"", hours_ago(19)),
        entry("act-002", ActivityKind::Return, "Bob Smith returned \"The Hobbit\"", hours_ago(3)),
        entry("act-001", ActivityKind::Issue, "Alice Johnson borrowed \"1984\"", hours_ago(2)),
    ];

    let mut data = LibraryData {
        users,
        books,
        copies,
        members,
        loans,
        reservations,
        activity,
    };
    let book_ids: Vec<String> = data.books.iter().map(|b| b.id.clone()).collect();
    for id in &book_ids {
        data.sync_book_counts(id);
    }
    let member_ids: Vec<String> = data.members.iter().map(|m| m.id.clone()).collect();
    for id in &member_ids {
        data.sync_member_borrowed(id);
    }

    Ok(data)
}

/// Empty catalog with a single administrator account
pub fn bootstrap(auth: &AuthConfig, today: NaiveDate) -> AppResult<LibraryData> {
    let admin = User {
        id: "usr-001".to_string(),
        email: auth.bootstrap_admin_email.trim().to_lowercase(),
        name: "Administrator".to_string(),
        role: Role::Admin,
        phone: None,
        address: None,
        membership_date: Some(today),
        member_id: None,
        password_hash: hash_password(&auth.bootstrap_admin_password)?,
    };

    Ok(LibraryData {
        users: vec![admin],
        ..LibraryData::default()
    })
}

#[allow(clippy::too_many_arguments)]
fn book(
    id: &str,
    isbn: &str,
    title: &str,
    author: &str,
    publisher: &str,
    published_year: i32,
    category: &str,
    description: &str,
    cover_image: &str,
) -> Book {
    Book {
        id: id.to_string(),
        isbn: isbn.to_string(),
        title: title.to_string(),
        author: author.to_string(),
        publisher: publisher.to_string(),
        published_year,
        category: category.to_string(),
        description: Some(description.to_string()),
        cover_image: Some(cover_image.to_string()),
        total_copies: 0,
        available_copies: 0,
    }
}

#[allow(clippy::too_many_arguments)]
fn member(
    id: &str,
    name: &str,
    email: &str,
    phone: &str,
    address: &str,
    membership_date: NaiveDate,
    membership_type: MembershipType,
    status: MemberStatus,
    user_id: Option<&str>,
) -> Member {
    Member {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        address: address.to_string(),
        membership_date,
        membership_type,
        status,
        max_books_allowed: membership_type.default_max_books(),
        current_borrowed: 0,
        user_id: user_id.map(str::to_string),
    }
}

fn loan(
    id: &str,
    copy_id: &str,
    book_id: &str,
    member_id: &str,
    issue_date: NaiveDate,
    due_date: NaiveDate,
    return_date: Option<NaiveDate>,
) -> Loan {
    Loan {
        id: id.to_string(),
        book_copy_id: copy_id.to_string(),
        book_id: book_id.to_string(),
        member_id: member_id.to_string(),
        issue_date,
        due_date,
        return_date,
        status: if return_date.is_some() {
            LoanStatus::Returned
        } else {
            LoanStatus::Issued
        },
        fine_amount: return_date.map(|_| rust_decimal::Decimal::ZERO),
    }
}

fn reservation(
    id: &str,
    book_id: &str,
    member_id: &str,
    reservation_date: NaiveDate,
    expiry_date: NaiveDate,
    status: ReservationStatus,
) -> Reservation {
    Reservation {
        id: id.to_string(),
        book_id: book_id.to_string(),
        member_id: member_id.to_string(),
        reservation_date,
        expiry_date,
        status,
        loan_id: None,
    }
}

fn entry(id: &str, kind: ActivityKind, description: &str, timestamp: DateTime<Utc>) -> Activity {
    Activity {
        id: id.to_string(),
        kind,
        description: description.to_string(),
        timestamp,
    }
}
