// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Host source fixtures
//!
//! Each fixture starts with a newline, so the first line of code is line 1.

/// Sample host sources carrying embedded SQL
pub struct HostFixtures;

impl HostFixtures {
    // ===== TypeScript =====

    /// Prisma `$queryRaw` tagged templates (matched by the built-in rule)
    pub const fn prisma() -> &'static str {
        r#"
import { PrismaClient } from "@prisma/client";

const prisma = new PrismaClient();

async function main() {
  const todo = await prisma.$queryRaw`SELECT * FROM todos WHERE id = 1;`;
  await prisma.$queryRaw`
    INSERT INTO todos
    (
        id,
        description,
        done
    )
    VALUES
    (
        1,
        "todo description",
        TRUE
    );
    `;
  console.log(todo);
}

main()
  .then(async () => {
    await prisma.$disconnect();
  })
  .catch(async (e) => {
    console.error(e);
    await prisma.$disconnect();
    process.exit(1);
  });
"#
    }

    /// Bun `sql` tagged templates
    pub const fn bun() -> &'static str {
        r#"
import { sql } from "bun";

async function main() {
  const todo = await sql`SELECT * FROM todos WHERE id = 1;`;
  await sql`
    INSERT INTO todos
    (
        id,
        description,
        done
    )
    VALUES
    (
        1,
        "todo description",
        TRUE
    );
    `;
  console.log(todo);
}
"#
    }

    /// TypeORM `entityManager.query(sql, params)`; SQL is argument 1 (one-based)
    pub const fn typeorm() -> &'static str {
        r#"
import { getManager } from "typeorm";

(async () => {
  const entityManager = getManager();
  const someQuery = await entityManager.query(
    "SELECT * FROM todos WHERE id = $1;",
    [1],
  );

  await entityManager.query(
    `
    INSERT INTO todos
    (
        id,
        description,
        done
    )
    VALUES
    (
        $1,
        "todo description",
        TRUE
    );
    `,
    [1],
  );
})();
"#
    }

    /// User-defined `query(conn, sql, params)`; SQL is argument 2 (one-based)
    pub const fn user_defined() -> &'static str {
        r#"
import { query, getConnection } from "./lib/db";

(async () => {
  const connection = getConnection();
  const someQuery = await query(
    connection,
    "SELECT * FROM todos WHERE id = $1;",
    [1],
  );

  await query(
    connection,
    `
    INSERT INTO todos
    (
        id,
        description,
        done
    )
    VALUES
    (
        $1,
        "todo description",
        TRUE
    );
    `,
    [1],
  );
})();
"#
    }

    /// Tagged template with `${}` substitutions (never extracted)
    pub const fn interpolated_template() -> &'static str {
        r#"
const id = 1;
const rows = await db.queryRaw`SELECT * FROM t WHERE id = ${id}`;
"#
    }

    // ===== Rust =====

    /// sqlx `query!` / `query_as!` macros (matched by the built-in rules)
    pub const fn sqlx() -> &'static str {
        r###"
async fn add_todo(pool: &PgPool, description: String) -> anyhow::Result<i64> {
    let rec = sqlx::query!(
        r#"
INSERT INTO todos ( description )
VALUES ( $1 )
RETURNING id
        "#,
        description
    )
    .fetch_one(pool)
    .await?;

    Ok(rec.id)
}

async fn list_todos(pool: &PgPool) -> anyhow::Result<Vec<Todo>> {
    let todos = sqlx::query_as!(Todo, "SELECT id, description, done FROM todos ORDER BY id")
        .fetch_all(pool)
        .await?;

    Ok(todos)
}
"###
    }

    /// diesel `sql_query(sql)` call
    pub const fn diesel() -> &'static str {
        r###"
use diesel::prelude::*;
use diesel::sql_query;

fn main() {
    let conn = getdbconn();

    let results = sql_query(
        r#"
SELECT id, description, done
FROM todos
WHERE id = ?
ORDER BY id
        "#,
    )
    .bind::<diesel::sql_types::Integer, _>(1)
    .load::<model::User>(&conn)
    .unwrap();
    println!("{:?}", results);
}
"###
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_start_with_newline() {
        for fixture in [
            HostFixtures::prisma(),
            HostFixtures::bun(),
            HostFixtures::typeorm(),
            HostFixtures::user_defined(),
            HostFixtures::interpolated_template(),
            HostFixtures::sqlx(),
            HostFixtures::diesel(),
        ] {
            assert!(fixture.starts_with('\n'));
        }
    }
}
