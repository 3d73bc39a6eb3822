use std::io::{BufRead, Write, stdin, stdout};
use std::str::FromStr;

use miette::{IntoDiagnostic, Result};
use strum::EnumString;

use limpet_db::{QueryResponse, RowData, SqliteManager};

/// Top-level CLI subcommands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(ascii_case_insensitive)]
enum Command {
    Sample,
    Test,
    Interactive,
}

/// Interactive-mode commands that take no argument.
///
/// `describe <table>` and `query <sql>` are dispatched separately by prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(ascii_case_insensitive)]
enum ReplWord {
    Tables,
    Help,
    Exit,
    Quit,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(false)
                .context_lines(3)
                .tab_width(4)
                .break_words(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    miette::set_panic_hook();

    let Some(arg) = std::env::args().nth(1) else {
        print_usage();
        return Ok(());
    };

    match Command::from_str(&arg) {
        Ok(Command::Sample) => create_sample_database(),
        Ok(Command::Test) => run_self_test(),
        Ok(Command::Interactive) => run_interactive(),
        Err(_) => {
            println!("Unknown command: {arg}");
            println!("Available commands: sample, test, interactive");
            Ok(())
        }
    }
}

fn print_usage() {
    println!("limpet - SQLite store management tool");
    println!();
    println!("Usage:");
    println!("  limpet sample      - Create a sample database");
    println!("  limpet interactive - Start interactive mode");
    println!("  limpet test        - Run a quick self-test");
}

// Every failure below is printed and skipped: this binary is a best-effort
// tool, so the typed errors the library raises stop at this layer.

fn create_table_logged(manager: &SqliteManager, name: &str, columns: &[&str]) {
    match manager.create_table(name, columns) {
        Ok(()) => println!("Table '{name}' created successfully"),
        Err(err) => println!("Error creating table: {err}"),
    }
}

fn insert_logged(manager: &SqliteManager, table: &str, row: RowData) {
    match manager.insert_row(table, &row) {
        Ok(()) => println!("Data inserted into '{table}' successfully"),
        Err(err) => println!("Error inserting data: {err}"),
    }
}

fn show_tables(manager: &SqliteManager) {
    match manager.list_tables() {
        Ok(tables) if tables.is_empty() => println!("No tables found in database"),
        Ok(tables) => {
            println!("Tables in database:");
            for table in &tables {
                println!("  - {table}");
            }
        }
        Err(err) => println!("Error showing tables: {err}"),
    }
}

fn show_table_structure(manager: &SqliteManager, name: &str) {
    match manager.describe_table(name) {
        Ok(columns) => {
            println!("Table structure for '{name}':");
            println!(
                "{: <12} | {: <10} | {: <8} | {: <11} | Default",
                "Column Name", "Type", "Not Null", "Primary Key"
            );
            println!("{}", "-".repeat(60));
            for col in &columns {
                println!(
                    "{: <12} | {: <10} | {: <8} | {: <11} | {}",
                    col.name,
                    col.decl_type,
                    col.not_null,
                    col.primary_key,
                    col.default_value.as_deref().unwrap_or("NULL"),
                );
            }
        }
        Err(err) => println!("Error describing table: {err}"),
    }
}

/// Prints a query response as a padded table, one indexed line per row.
fn print_results(response: &QueryResponse) {
    if response.rows.is_empty() {
        println!("No results");
        return;
    }

    let mut line = format!("{: <8}", "Results");
    for column in &response.columns {
        line.push_str(&format!(" | {: <8}", column));
    }
    println!("{line}");

    for (idx, row) in response.rows.iter().enumerate() {
        let mut line = format!("{: <8}", idx);
        for value in &row.values {
            line.push_str(&format!(" | {: <8}", value.to_string()));
        }
        println!("{line}");
    }
}

/// Builds `sample_complete.db`: a users table, a posts table referencing it,
/// and a handful of seed rows.
fn create_sample_database() -> Result<()> {
    let mut manager = SqliteManager::new("sample_complete.db");
    if let Err(err) = manager.connect() {
        println!("Error connecting to database: {err}");
        return Ok(());
    }
    println!("Connected to database: sample_complete.db");

    create_table_logged(
        &manager,
        "users",
        &[
            "id INTEGER PRIMARY KEY AUTOINCREMENT",
            "username TEXT UNIQUE NOT NULL",
            "email TEXT UNIQUE NOT NULL",
            "full_name TEXT",
            "created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP",
        ],
    );
    create_table_logged(
        &manager,
        "posts",
        &[
            "id INTEGER PRIMARY KEY AUTOINCREMENT",
            "user_id INTEGER",
            "title TEXT NOT NULL",
            "content TEXT",
            "created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP",
            "FOREIGN KEY (user_id) REFERENCES users (id)",
        ],
    );

    let users = [
        ("john_doe", "john@example.com", "John Doe"),
        ("jane_smith", "jane@example.com", "Jane Smith"),
        ("bob_wilson", "bob@example.com", "Bob Wilson"),
    ];
    for (username, email, full_name) in users {
        insert_logged(
            &manager,
            "users",
            RowData::new()
                .set("username", username)
                .set("email", email)
                .set("full_name", full_name),
        );
    }

    let posts = [
        (1, "My First Post", "This is my first blog post!"),
        (1, "Learning SQLite", "SQLite is a great database for small projects."),
        (2, "Hello World", "Hello from Jane!"),
        (3, "Database Design", "Good database design is crucial for any application."),
    ];
    for (user_id, title, content) in posts {
        insert_logged(
            &manager,
            "posts",
            RowData::new()
                .set("user_id", user_id)
                .set("title", title)
                .set("content", content),
        );
    }

    show_tables(&manager);

    println!("\nSample Users:");
    match manager.query("SELECT * FROM users", &[]) {
        Ok(response) => print_results(&response),
        Err(err) => println!("Error executing query: {err}"),
    }

    println!("\nSample Posts:");
    match manager.query("SELECT * FROM posts", &[]) {
        Ok(response) => print_results(&response),
        Err(err) => println!("Error executing query: {err}"),
    }

    manager.disconnect();
    println!("\nSample database created: sample_complete.db");
    Ok(())
}

/// Quick end-to-end check against a throwaway store file.
fn run_self_test() -> Result<()> {
    println!("Testing SQLite functionality...");

    let mut manager = SqliteManager::new("test.db");
    if let Err(err) = manager.connect() {
        println!("Error connecting to database: {err}");
        return Ok(());
    }

    create_table_logged(
        &manager,
        "test_table",
        &["id INTEGER PRIMARY KEY", "name TEXT", "value INTEGER"],
    );
    insert_logged(
        &manager,
        "test_table",
        RowData::new().set("id", 1).set("name", "Test Item").set("value", 100),
    );

    match manager.query("SELECT * FROM test_table", &[]) {
        Ok(response) => {
            println!("Test query results:");
            print_results(&response);
        }
        Err(err) => println!("Error executing query: {err}"),
    }

    manager.disconnect();
    std::fs::remove_file("test.db").ok();
    println!("SQLite test completed successfully!");
    Ok(())
}

fn print_repl_help() {
    println!("Available commands:");
    println!("  tables                    - Show all tables");
    println!("  describe <table_name>     - Show table structure");
    println!("  query <sql_query>         - Execute SQL query");
    println!("  exit/quit                 - Exit interactive mode");
}

/// Read-eval loop over one store.
///
/// Bare words go through [`ReplWord`]; `describe` and `query` carry an
/// argument, so they dispatch on their prefix instead.
fn run_interactive() -> Result<()> {
    println!("SQLite Interactive Mode");
    println!("Type 'help' for commands, 'exit' to quit");

    let mut stdin = stdin().lock();
    let mut stdout = stdout().lock();

    stdout
        .write_all(b"Enter database name (or press Enter for 'interactive.db'): ")
        .into_diagnostic()?;
    stdout.flush().into_diagnostic()?;

    let mut buf = String::new();
    stdin.read_line(&mut buf).into_diagnostic()?;
    let db_name = match buf.trim() {
        "" => "interactive.db".to_string(),
        name => name.to_string(),
    };

    let mut manager = SqliteManager::new(&db_name);
    if let Err(err) = manager.connect() {
        println!("Error connecting to database: {err}");
        return Ok(());
    }
    println!("Connected to database: {db_name}");

    loop {
        buf.clear();
        stdout
            .write_all(format!("\n[{db_name}]> ").as_bytes())
            .into_diagnostic()?;
        stdout.flush().into_diagnostic()?;

        if stdin.read_line(&mut buf).into_diagnostic()? == 0 {
            // stdin closed
            break;
        }
        let input = buf.trim();
        if input.is_empty() {
            continue;
        }

        if let Ok(word) = ReplWord::from_str(input) {
            match word {
                ReplWord::Exit | ReplWord::Quit => break,
                ReplWord::Help => print_repl_help(),
                ReplWord::Tables => show_tables(&manager),
            }
            continue;
        }

        match input.split_once(' ') {
            Some(("describe", table_name)) => {
                show_table_structure(&manager, table_name.trim());
            }
            Some(("query", sql)) => match manager.query(sql.trim(), &[]) {
                Ok(response) => print_results(&response),
                Err(err) => println!("Error executing query: {err}"),
            },
            _ => println!("Unknown command. Type 'help' for available commands."),
        }
    }

    manager.disconnect();
    println!("Exiting limpet");
    Ok(())
}
