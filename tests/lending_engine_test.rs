use chrono::{Duration, Utc};
use library_inventory::adapters::mock::InMemoryLibrary;
use library_inventory::application::{
    self, LendingError, ServiceDependencies, add_book, add_member, borrow_book, get_book,
    get_books, get_in_stock_books, get_member, remove_book, return_book, update_book,
    update_member,
};
use library_inventory::domain::commands::{BorrowBook, ReturnBook};
use library_inventory::domain::{Book, BookDraft, Member, MemberDraft, MemberUpdate};
use library_inventory::ports::{BookRepository, LoanRepository, MemberRepository};
use std::sync::Arc;

// ============================================================================
// テスト用セットアップ
// ============================================================================

/// インメモリ実装で依存関係一式を構築する
fn make_deps() -> ServiceDependencies {
    let store = Arc::new(InMemoryLibrary::new());

    ServiceDependencies {
        book_repository: store.clone() as Arc<dyn BookRepository>,
        member_repository: store.clone() as Arc<dyn MemberRepository>,
        loan_repository: store as Arc<dyn LoanRepository>,
    }
}

fn book_draft(code: &str, stock: i32) -> BookDraft {
    BookDraft {
        code: code.to_string(),
        title: "Harry Potter".to_string(),
        author: "J.K Rowling".to_string(),
        stock,
    }
}

fn member_draft(code: &str) -> MemberDraft {
    MemberDraft {
        code: code.to_string(),
        name: "Angga".to_string(),
    }
}

async fn seed_book(deps: &ServiceDependencies, code: &str, stock: i32) -> Book {
    add_book(deps, book_draft(code, stock))
        .await
        .expect("book should be created")
}

async fn seed_member(deps: &ServiceDependencies, code: &str) -> Member {
    add_member(deps, member_draft(code))
        .await
        .expect("member should be created")
}

fn borrow_cmd(book_code: &str, member_code: &str) -> BorrowBook {
    BorrowBook {
        book_code: book_code.to_string(),
        member_code: member_code.to_string(),
        borrowed_at: Utc::now(),
    }
}

fn return_cmd(book_code: &str, member_code: &str) -> ReturnBook {
    ReturnBook {
        book_code: book_code.to_string(),
        member_code: member_code.to_string(),
        returned_at: Utc::now(),
    }
}

// ============================================================================
// 貸出：正常系
// ============================================================================

#[tokio::test]
async fn test_borrow_decrements_stock_and_records_loan() {
    let deps = make_deps();
    let book = seed_book(&deps, "JK-45", 1).await;
    let member = seed_member(&deps, "M001").await;

    borrow_book(&deps, borrow_cmd("JK-45", "M001"))
        .await
        .expect("borrow should succeed");

    // 在庫が1減り、台帳にレコードが作られる
    let book_after = get_book(&deps, "JK-45").await.unwrap();
    assert_eq!(book_after.stock, 0);

    let details = get_member(&deps, "M001").await.unwrap();
    assert_eq!(details.loans.len(), 1);
    assert_eq!(details.loans[0].book_id, book.id);
    assert_eq!(details.loans[0].member_id, member.id);
}

#[tokio::test]
async fn test_borrow_then_return_round_trip() {
    let deps = make_deps();
    seed_book(&deps, "JK-45", 1).await;
    seed_member(&deps, "M001").await;

    borrow_book(&deps, borrow_cmd("JK-45", "M001"))
        .await
        .expect("borrow should succeed");
    return_book(&deps, return_cmd("JK-45", "M001"))
        .await
        .expect("return should succeed");

    // 在庫が元に戻り、台帳レコードが消える
    let book_after = get_book(&deps, "JK-45").await.unwrap();
    assert_eq!(book_after.stock, 1);

    let details = get_member(&deps, "M001").await.unwrap();
    assert!(details.loans.is_empty());
}

// ============================================================================
// 貸出：拒否されるケース
// ============================================================================

#[tokio::test]
async fn test_borrow_fails_when_book_unknown() {
    let deps = make_deps();
    seed_member(&deps, "M001").await;

    let result = borrow_book(&deps, borrow_cmd("NO-SUCH", "M001")).await;
    assert!(matches!(result, Err(LendingError::StockNotAvailable)));
}

#[tokio::test]
async fn test_borrow_fails_when_stock_exhausted() {
    let deps = make_deps();
    seed_book(&deps, "JK-45", 1).await;
    seed_member(&deps, "M001").await;
    seed_member(&deps, "M002").await;

    borrow_book(&deps, borrow_cmd("JK-45", "M001"))
        .await
        .expect("first borrow should succeed");

    // 在庫0の書籍は2人目には貸せない
    let result = borrow_book(&deps, borrow_cmd("JK-45", "M002")).await;
    assert!(matches!(result, Err(LendingError::StockNotAvailable)));
}

#[tokio::test]
async fn test_borrow_fails_when_member_unknown() {
    let deps = make_deps();
    seed_book(&deps, "JK-45", 1).await;

    let result = borrow_book(&deps, borrow_cmd("JK-45", "NO-SUCH")).await;
    assert!(matches!(result, Err(LendingError::MemberNotFound)));
}

#[tokio::test]
async fn test_borrow_fails_for_penalized_member() {
    let deps = make_deps();
    seed_book(&deps, "JK-45", 1).await;
    seed_member(&deps, "M001").await;

    // 1日前にペナルティが付いた会員
    update_member(
        &deps,
        MemberUpdate {
            name: "Angga".to_string(),
            penalized_at: Some(Utc::now() - Duration::days(1)),
        },
        "M001",
    )
    .await
    .unwrap();

    let result = borrow_book(&deps, borrow_cmd("JK-45", "M001")).await;
    assert!(matches!(result, Err(LendingError::MemberPenalized)));
}

#[tokio::test]
async fn test_borrow_succeeds_after_penalty_window() {
    let deps = make_deps();
    seed_book(&deps, "JK-45", 1).await;
    seed_member(&deps, "M001").await;

    // 4日前のペナルティは期間（3日）を過ぎている
    update_member(
        &deps,
        MemberUpdate {
            name: "Angga".to_string(),
            penalized_at: Some(Utc::now() - Duration::days(4)),
        },
        "M001",
    )
    .await
    .unwrap();

    borrow_book(&deps, borrow_cmd("JK-45", "M001"))
        .await
        .expect("borrow should succeed after the window");

    // 期間経過後もpenalized_atは消去されない（読み取り時判定のみ）
    let details = get_member(&deps, "M001").await.unwrap();
    assert!(details.member.penalized_at.is_some());
}

#[tokio::test]
async fn test_borrow_fails_at_loan_limit() {
    let deps = make_deps();
    seed_book(&deps, "JK-45", 1).await;
    seed_book(&deps, "SHR-1", 1).await;
    seed_book(&deps, "TW-11", 1).await;
    seed_member(&deps, "M001").await;

    // 2冊までは借りられる
    borrow_book(&deps, borrow_cmd("JK-45", "M001"))
        .await
        .expect("first borrow should succeed");
    borrow_book(&deps, borrow_cmd("SHR-1", "M001"))
        .await
        .expect("second borrow should succeed");

    // 3冊目は拒否される
    let result = borrow_book(&deps, borrow_cmd("TW-11", "M001")).await;
    assert!(matches!(result, Err(LendingError::BorrowLimitExceeded)));
}

#[tokio::test]
async fn test_borrow_same_book_twice_conflicts() {
    let deps = make_deps();
    seed_book(&deps, "JK-45", 2).await;
    seed_member(&deps, "M001").await;

    borrow_book(&deps, borrow_cmd("JK-45", "M001"))
        .await
        .expect("first borrow should succeed");

    // 同じ (書籍, 会員) の組の貸出は高々1件
    let result = borrow_book(&deps, borrow_cmd("JK-45", "M001")).await;
    assert!(matches!(result, Err(LendingError::LoanAlreadyExists)));
}

#[tokio::test]
async fn test_borrow_fails_on_empty_codes() {
    let deps = make_deps();

    let result = borrow_book(&deps, borrow_cmd("", "M001")).await;
    assert!(matches!(result, Err(LendingError::Validation(_))));

    let result = borrow_book(&deps, borrow_cmd("JK-45", "")).await;
    assert!(matches!(result, Err(LendingError::Validation(_))));
}

// ============================================================================
// 返却
// ============================================================================

#[tokio::test]
async fn test_return_without_loan_fails() {
    let deps = make_deps();
    seed_book(&deps, "JK-45", 1).await;
    seed_member(&deps, "M001").await;

    let result = return_book(&deps, return_cmd("JK-45", "M001")).await;
    assert!(matches!(result, Err(LendingError::LoanNotFound)));
}

#[tokio::test]
async fn test_return_on_time_does_not_penalize() {
    let deps = make_deps();
    seed_book(&deps, "JK-45", 1).await;
    seed_member(&deps, "M001").await;

    borrow_book(&deps, borrow_cmd("JK-45", "M001")).await.unwrap();
    return_book(&deps, return_cmd("JK-45", "M001")).await.unwrap();

    let details = get_member(&deps, "M001").await.unwrap();
    assert!(details.member.penalized_at.is_none());
}

#[tokio::test]
async fn test_late_return_penalizes_member() {
    let deps = make_deps();
    seed_book(&deps, "JK-45", 1).await;
    seed_member(&deps, "M001").await;

    // 8日前に借りた貸出を今返す
    let borrowed_at = Utc::now() - Duration::days(8);
    borrow_book(
        &deps,
        BorrowBook {
            book_code: "JK-45".to_string(),
            member_code: "M001".to_string(),
            borrowed_at,
        },
    )
    .await
    .unwrap();

    let returned_at = Utc::now();
    return_book(
        &deps,
        ReturnBook {
            book_code: "JK-45".to_string(),
            member_code: "M001".to_string(),
            returned_at,
        },
    )
    .await
    .unwrap();

    // ペナルティの起点は返却処理の時刻になる
    let details = get_member(&deps, "M001").await.unwrap();
    assert_eq!(details.member.penalized_at, Some(returned_at));

    // 在庫は戻り、台帳レコードは消えている
    let book_after = get_book(&deps, "JK-45").await.unwrap();
    assert_eq!(book_after.stock, 1);
    assert!(details.loans.is_empty());

    // ペナルティ期間中は新たに借りられない
    let result = borrow_book(&deps, borrow_cmd("JK-45", "M001")).await;
    assert!(matches!(result, Err(LendingError::MemberPenalized)));
}

#[tokio::test]
async fn test_return_at_exactly_seven_days_does_not_penalize() {
    let deps = make_deps();
    seed_book(&deps, "JK-45", 1).await;
    seed_member(&deps, "M001").await;

    let borrowed_at = Utc::now();
    borrow_book(
        &deps,
        BorrowBook {
            book_code: "JK-45".to_string(),
            member_code: "M001".to_string(),
            borrowed_at,
        },
    )
    .await
    .unwrap();

    // 境界値：ちょうど7日後の返却は延滞ではない
    return_book(
        &deps,
        ReturnBook {
            book_code: "JK-45".to_string(),
            member_code: "M001".to_string(),
            returned_at: borrowed_at + Duration::days(7),
        },
    )
    .await
    .unwrap();

    let details = get_member(&deps, "M001").await.unwrap();
    assert!(details.member.penalized_at.is_none());
}

// ============================================================================
// 同時実行
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_concurrent_borrows_leave_stock_non_negative() {
    let deps = make_deps();
    seed_book(&deps, "JK-45", 1).await;

    let member_codes: Vec<String> = (1..=8).map(|i| format!("M{:03}", i)).collect();
    for code in &member_codes {
        seed_member(&deps, code).await;
    }

    // 在庫1冊に対して8人が同時に借りようとする
    let mut handles = Vec::new();
    for code in member_codes {
        let deps = deps.clone();
        handles.push(tokio::spawn(async move {
            borrow_book(&deps, borrow_cmd("JK-45", &code)).await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        let result = handle.await.expect("task should not panic");
        match result {
            Ok(()) => successes += 1,
            Err(LendingError::StockNotAvailable) => {}
            Err(e) => panic!("unexpected error: {:?}", e),
        }
    }

    // 成功はちょうど1件、在庫は0のまま（負にならない）
    assert_eq!(successes, 1);
    let book_after = get_book(&deps, "JK-45").await.unwrap();
    assert_eq!(book_after.stock, 0);
}

// ============================================================================
// カタログCRUD
// ============================================================================

#[tokio::test]
async fn test_add_book_with_duplicate_code_conflicts() {
    let deps = make_deps();
    seed_book(&deps, "JK-45", 1).await;

    let result = add_book(&deps, book_draft("JK-45", 3)).await;
    assert!(matches!(result, Err(LendingError::BookAlreadyExists)));
}

#[tokio::test]
async fn test_add_book_rejects_negative_stock() {
    let deps = make_deps();

    let result = add_book(&deps, book_draft("JK-45", -1)).await;
    assert!(matches!(result, Err(LendingError::Validation(_))));
}

#[tokio::test]
async fn test_update_unknown_book_fails() {
    let deps = make_deps();

    let result = update_book(&deps, book_draft("JK-45", 3), "JK-45").await;
    assert!(matches!(result, Err(LendingError::BookNotFound)));
}

#[tokio::test]
async fn test_update_book_overwrites_fields() {
    let deps = make_deps();
    seed_book(&deps, "JK-45", 1).await;

    let draft = BookDraft {
        code: "JK-45".to_string(),
        title: "Harry Potter and the Chamber of Secrets".to_string(),
        author: "J.K Rowling".to_string(),
        stock: 5,
    };
    update_book(&deps, draft, "JK-45").await.unwrap();

    let book = get_book(&deps, "JK-45").await.unwrap();
    assert_eq!(book.title, "Harry Potter and the Chamber of Secrets");
    assert_eq!(book.stock, 5);
}

#[tokio::test]
async fn test_remove_book_blocked_while_borrowed() {
    let deps = make_deps();
    seed_book(&deps, "JK-45", 1).await;
    seed_member(&deps, "M001").await;

    borrow_book(&deps, borrow_cmd("JK-45", "M001")).await.unwrap();

    // 貸出中は削除できない
    let result = remove_book(&deps, "JK-45").await;
    assert!(matches!(result, Err(LendingError::BookCurrentlyBorrowed)));

    // 返却後は削除できる
    return_book(&deps, return_cmd("JK-45", "M001")).await.unwrap();
    remove_book(&deps, "JK-45").await.expect("remove should succeed");

    let result = get_book(&deps, "JK-45").await;
    assert!(matches!(result, Err(LendingError::BookNotFound)));
}

#[tokio::test]
async fn test_in_stock_books_filters_out_exhausted() {
    let deps = make_deps();
    seed_book(&deps, "JK-45", 1).await;
    seed_book(&deps, "SHR-1", 0).await;

    let all = get_books(&deps).await.unwrap();
    assert_eq!(all.len(), 2);

    let in_stock = get_in_stock_books(&deps).await.unwrap();
    assert_eq!(in_stock.len(), 1);
    assert_eq!(in_stock[0].code, "JK-45");
}

// ============================================================================
// 会員CRUD
// ============================================================================

#[tokio::test]
async fn test_add_member_with_duplicate_code_conflicts() {
    let deps = make_deps();
    seed_member(&deps, "M001").await;

    let result = add_member(&deps, member_draft("M001")).await;
    assert!(matches!(result, Err(LendingError::MemberAlreadyExists)));
}

#[tokio::test]
async fn test_new_member_starts_without_penalty() {
    let deps = make_deps();
    let member = seed_member(&deps, "M001").await;
    assert!(member.penalized_at.is_none());
}

#[tokio::test]
async fn test_update_member_can_clear_penalty() {
    let deps = make_deps();
    seed_member(&deps, "M001").await;

    update_member(
        &deps,
        MemberUpdate {
            name: "Angga".to_string(),
            penalized_at: Some(Utc::now()),
        },
        "M001",
    )
    .await
    .unwrap();

    // 会員更新はペナルティを消去できる唯一の操作
    update_member(
        &deps,
        MemberUpdate {
            name: "Angga".to_string(),
            penalized_at: None,
        },
        "M001",
    )
    .await
    .unwrap();

    let details = get_member(&deps, "M001").await.unwrap();
    assert!(details.member.penalized_at.is_none());
}

#[tokio::test]
async fn test_lookup_by_server_assigned_id() {
    let deps = make_deps();
    let book = seed_book(&deps, "JK-45", 1).await;
    let member = seed_member(&deps, "M001").await;

    // 採番されたIDでも取得できる
    let found = application::get_book_by_id(&deps, book.id).await.unwrap();
    assert_eq!(found.code, "JK-45");

    let found = application::get_member_by_id(&deps, member.id).await.unwrap();
    assert_eq!(found.code, "M001");
}

#[tokio::test]
async fn test_get_members_reports_borrow_counts() {
    let deps = make_deps();
    seed_book(&deps, "JK-45", 1).await;
    seed_book(&deps, "SHR-1", 1).await;
    seed_member(&deps, "M001").await;
    seed_member(&deps, "M002").await;

    borrow_book(&deps, borrow_cmd("JK-45", "M001")).await.unwrap();
    borrow_book(&deps, borrow_cmd("SHR-1", "M001")).await.unwrap();

    let details = application::get_members(&deps).await.unwrap();
    assert_eq!(details.len(), 2);
    assert_eq!(details[0].member.code, "M001");
    assert_eq!(details[0].loans.len(), 2);
    assert_eq!(details[1].member.code, "M002");
    assert!(details[1].loans.is_empty());
}
