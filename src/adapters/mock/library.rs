use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::{
    Book, BookDraft, BookId, Loan, Member, MemberDraft, MemberId, MemberUpdate,
};
use crate::ports::{
    BookRepository, LoanRepository, MemberRepository, RepositoryError, Result,
};

/// 3テーブル分のインメモリ状態
#[derive(Default)]
struct State {
    books: HashMap<i32, Book>,
    members: HashMap<i32, Member>,
    loans: HashMap<(i32, i32), Loan>,
    next_book_id: i32,
    next_member_id: i32,
}

/// 全ポートのインメモリ実装
///
/// 3つのリポジトリポートを1つの構造体で実装し、単一のMutexで
/// 状態全体を守る。貸出の「在庫確認＋減算＋記録」がロック中に
/// 完結するため、PostgreSQL実装のトランザクションと同じ
/// 直列化保証が得られる。テストとローカル起動に使用する。
pub struct InMemoryLibrary {
    state: Mutex<State>,
}

impl InMemoryLibrary {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }
}

impl Default for InMemoryLibrary {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookRepository for InMemoryLibrary {
    async fn find_by_code(&self, code: &str) -> Result<Option<Book>> {
        let state = self.state.lock().unwrap();
        Ok(state.books.values().find(|b| b.code == code).cloned())
    }

    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>> {
        let state = self.state.lock().unwrap();
        Ok(state.books.get(&id.value()).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Book>> {
        let state = self.state.lock().unwrap();
        let mut books: Vec<Book> = state.books.values().cloned().collect();
        books.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(books)
    }

    async fn find_in_stock(&self) -> Result<Vec<Book>> {
        let state = self.state.lock().unwrap();
        let mut books: Vec<Book> = state
            .books
            .values()
            .filter(|b| b.in_stock())
            .cloned()
            .collect();
        books.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(books)
    }

    async fn insert(&self, draft: &BookDraft) -> Result<Book> {
        let mut state = self.state.lock().unwrap();

        if state.books.values().any(|b| b.code == draft.code) {
            return Err(RepositoryError::Duplicate);
        }

        state.next_book_id += 1;
        let book = Book {
            id: BookId::new(state.next_book_id),
            code: draft.code.clone(),
            title: draft.title.clone(),
            author: draft.author.clone(),
            stock: draft.stock,
        };
        state.books.insert(book.id.value(), book.clone());

        Ok(book)
    }

    async fn update(&self, draft: &BookDraft, code: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();

        let book = state
            .books
            .values_mut()
            .find(|b| b.code == code)
            .ok_or(RepositoryError::NotFound)?;

        book.title = draft.title.clone();
        book.author = draft.author.clone();
        book.stock = draft.stock;

        Ok(())
    }

    async fn delete(&self, code: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();

        let book_id = state
            .books
            .values()
            .find(|b| b.code == code)
            .map(|b| b.id.value())
            .ok_or(RepositoryError::NotFound)?;

        if state.loans.keys().any(|(b, _)| *b == book_id) {
            return Err(RepositoryError::LoanInProgress);
        }

        state.books.remove(&book_id);

        Ok(())
    }
}

#[async_trait]
impl MemberRepository for InMemoryLibrary {
    async fn find_by_code(&self, code: &str) -> Result<Option<Member>> {
        let state = self.state.lock().unwrap();
        Ok(state.members.values().find(|m| m.code == code).cloned())
    }

    async fn find_by_id(&self, id: MemberId) -> Result<Option<Member>> {
        let state = self.state.lock().unwrap();
        Ok(state.members.get(&id.value()).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Member>> {
        let state = self.state.lock().unwrap();
        let mut members: Vec<Member> = state.members.values().cloned().collect();
        members.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(members)
    }

    async fn insert(&self, draft: &MemberDraft) -> Result<Member> {
        let mut state = self.state.lock().unwrap();

        if state.members.values().any(|m| m.code == draft.code) {
            return Err(RepositoryError::Duplicate);
        }

        state.next_member_id += 1;
        let member = Member {
            id: MemberId::new(state.next_member_id),
            code: draft.code.clone(),
            name: draft.name.clone(),
            penalized_at: None,
        };
        state.members.insert(member.id.value(), member.clone());

        Ok(member)
    }

    async fn update(&self, update: &MemberUpdate, code: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();

        let member = state
            .members
            .values_mut()
            .find(|m| m.code == code)
            .ok_or(RepositoryError::NotFound)?;

        member.name = update.name.clone();
        member.penalized_at = update.penalized_at;

        Ok(())
    }
}

#[async_trait]
impl LoanRepository for InMemoryLibrary {
    async fn find_by_book_and_member(
        &self,
        book_id: BookId,
        member_id: MemberId,
    ) -> Result<Option<Loan>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .loans
            .get(&(book_id.value(), member_id.value()))
            .cloned())
    }

    async fn find_by_member(&self, member_id: MemberId) -> Result<Vec<Loan>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .loans
            .values()
            .filter(|l| l.member_id == member_id)
            .cloned()
            .collect())
    }

    /// 在庫確認・減算・台帳記録をロック中に一括で行う
    async fn insert(
        &self,
        book_id: BookId,
        member_id: MemberId,
        borrowed_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();

        if state.loans.contains_key(&(book_id.value(), member_id.value())) {
            return Err(RepositoryError::Duplicate);
        }

        let book = state
            .books
            .get_mut(&book_id.value())
            .ok_or(RepositoryError::NotFound)?;

        if book.stock < 1 {
            return Err(RepositoryError::StockExhausted);
        }
        book.stock -= 1;

        state.loans.insert(
            (book_id.value(), member_id.value()),
            Loan {
                book_id,
                member_id,
                borrowed_at,
            },
        );

        Ok(())
    }

    async fn delete(&self, book_id: BookId, member_id: MemberId) -> Result<()> {
        let mut state = self.state.lock().unwrap();

        state
            .loans
            .remove(&(book_id.value(), member_id.value()))
            .ok_or(RepositoryError::NotFound)?;

        if let Some(book) = state.books.get_mut(&book_id.value()) {
            book.stock += 1;
        }

        Ok(())
    }
}
