//! Fixed catalog queries of the DM dialect.
//!
//! All parameters are positional. Every result column is aliased in upper case; rows
//! are folded to upper case before decoding when the driver lowers labels.

use indoc::indoc;

/// Columns of one table, view or materialized view. Params: `(schema, table)`.
pub const COLUMNS_SQL: &str = indoc! {r#"
    SELECT
        A.COLUMN_NAME,
        A.DATA_TYPE,
        A.DATA_PRECISION,
        A.DATA_SCALE,
        (
          CASE A.CHAR_USED WHEN 'C' THEN A.CHAR_LENGTH
            ELSE A.DATA_LENGTH
          END
        ) AS DATA_LENGTH,
        A.NULLABLE,
        A.DATA_DEFAULT,
        COM.COMMENTS AS COLUMN_COMMENT,
        (CASE WHEN C.COL_NAME IS NULL THEN '0' ELSE '1' END) AS IS_INCREMENT,
        (CASE WHEN D.COLUMN_NAME IS NULL THEN '0' ELSE '1' END) AS IS_PRIMARY_KEY
    FROM ALL_TAB_COLUMNS A
        INNER JOIN ALL_OBJECTS B ON B.OWNER = A.OWNER AND LTRIM(B.OBJECT_NAME) = LTRIM(A.TABLE_NAME)
        LEFT JOIN ALL_COL_COMMENTS COM
            ON A.OWNER = COM.OWNER AND A.TABLE_NAME = COM.TABLE_NAME AND A.COLUMN_NAME = COM.COLUMN_NAME
        LEFT JOIN (
            SELECT SCH.NAME AS SCHEMA_NAME, OBJ.NAME AS TAB_NAME, COL.NAME AS COL_NAME
            FROM SYSCOLUMNS COL
                INNER JOIN SYSOBJECTS OBJ ON OBJ.ID = COL.ID
                INNER JOIN SYSOBJECTS SCH ON SCH.ID = OBJ.SCHID
            WHERE COL.INFO2 & 1 = 1
        ) C ON C.SCHEMA_NAME = A.OWNER AND C.TAB_NAME = A.TABLE_NAME AND C.COL_NAME = A.COLUMN_NAME
        LEFT JOIN (
            SELECT COL.OWNER, COL.TABLE_NAME, COL.COLUMN_NAME
            FROM ALL_CONSTRAINTS CON
                INNER JOIN ALL_CONS_COLUMNS COL
                    ON CON.OWNER = COL.OWNER AND CON.CONSTRAINT_NAME = COL.CONSTRAINT_NAME
            WHERE CON.CONSTRAINT_TYPE = 'P'
        ) D ON D.OWNER = A.OWNER AND D.TABLE_NAME = A.TABLE_NAME AND D.COLUMN_NAME = A.COLUMN_NAME
    WHERE
        A.OWNER = ?
        AND A.TABLE_NAME = ?
        AND B.OBJECT_TYPE IN ('TABLE', 'VIEW', 'MATERIALIZED VIEW')
    ORDER BY A.COLUMN_ID
"#};

/// Constraint columns of one table, with the referenced side left-joined.
/// Params: `(schema, table)`.
pub const CONSTRAINTS_SQL: &str = indoc! {r#"
    SELECT
        /*+ PUSH_PRED(C) PUSH_PRED(D) PUSH_PRED(E) */
        D.CONSTRAINT_NAME,
        D.CONSTRAINT_TYPE,
        C.COLUMN_NAME,
        C.POSITION,
        D.R_CONSTRAINT_NAME,
        E.OWNER AS SCHEMA_REF,
        E.TABLE_NAME AS TABLE_REF,
        F.COLUMN_NAME AS COLUMN_REF,
        D.DELETE_RULE,
        D.SEARCH_CONDITION,
        C.TABLE_NAME
    FROM ALL_CONS_COLUMNS C
        INNER JOIN ALL_CONSTRAINTS D ON D.OWNER = C.OWNER AND D.CONSTRAINT_NAME = C.CONSTRAINT_NAME
        LEFT JOIN ALL_CONSTRAINTS E ON E.OWNER = D.R_OWNER AND E.CONSTRAINT_NAME = D.R_CONSTRAINT_NAME
        LEFT JOIN ALL_CONS_COLUMNS F
            ON F.OWNER = E.OWNER AND F.CONSTRAINT_NAME = E.CONSTRAINT_NAME AND F.POSITION = C.POSITION
    WHERE
        C.OWNER = ?
        AND C.TABLE_NAME = ?
    ORDER BY D.CONSTRAINT_NAME, C.POSITION
"#};

/// Indexes of one table, flagging the ones backing the primary key.
/// Params: `(schema, table)`.
pub const INDEXES_SQL: &str = indoc! {r#"
    SELECT
        /*+ PUSH_PRED(UI) PUSH_PRED(UICOL) PUSH_PRED(UC) */
        UI.INDEX_NAME,
        UICOL.COLUMN_NAME,
        CASE UI.UNIQUENESS WHEN 'UNIQUE' THEN 1 ELSE 0 END AS INDEX_IS_UNIQUE,
        CASE WHEN UC.CONSTRAINT_NAME IS NOT NULL THEN 1 ELSE 0 END AS INDEX_IS_PRIMARY
    FROM ALL_INDEXES UI
        LEFT JOIN ALL_IND_COLUMNS UICOL
            ON UICOL.INDEX_OWNER = UI.OWNER AND UICOL.INDEX_NAME = UI.INDEX_NAME
        LEFT JOIN ALL_CONSTRAINTS UC
            ON UC.OWNER = UI.TABLE_OWNER AND UC.INDEX_NAME = UI.INDEX_NAME AND UC.CONSTRAINT_TYPE = 'P'
    WHERE
        UI.TABLE_OWNER = ?
        AND UI.TABLE_NAME = ?
    ORDER BY UI.INDEX_NAME, UICOL.COLUMN_POSITION
"#};

/// Unique indexes of one table. Params: `(schema, table)`.
pub const UNIQUE_INDEXES_SQL: &str = indoc! {r#"
    SELECT
        DIC.INDEX_NAME,
        DIC.COLUMN_NAME
    FROM ALL_INDEXES DI
        INNER JOIN ALL_IND_COLUMNS DIC ON DI.TABLE_NAME = DIC.TABLE_NAME AND DI.INDEX_NAME = DIC.INDEX_NAME
    WHERE
        DI.UNIQUENESS = 'UNIQUE'
        AND DIC.TABLE_OWNER = ?
        AND DIC.TABLE_NAME = ?
    ORDER BY DIC.TABLE_NAME, DIC.INDEX_NAME, DIC.COLUMN_POSITION
"#};

/// Sequence fed by a trigger on the table. Params: `(table)`.
pub const SEQUENCE_SQL: &str = indoc! {r#"
    SELECT
        UD.REFERENCED_NAME AS SEQUENCE_NAME
    FROM USER_DEPENDENCIES UD
        JOIN USER_TRIGGERS UT ON (UT.TRIGGER_NAME = UD.NAME)
    WHERE
        UT.TABLE_NAME = ?
        AND UD.TYPE = 'TRIGGER'
        AND UD.REFERENCED_TYPE = 'SEQUENCE'
"#};

/// Schemas owned by non-system users.
pub const SCHEMAS_SQL: &str = indoc! {r#"
    SELECT U.USERNAME
    FROM DBA_USERS U
    WHERE U.DEFAULT_TABLESPACE NOT IN ('SYSTEM', 'SYSAUX')
    ORDER BY U.USERNAME ASC
"#};

/// Tables, views and materialized views of the session user.
pub const OWN_TABLES_SQL: &str = indoc! {r#"
    SELECT
        TABLE_NAME
    FROM USER_TABLES
    UNION ALL
    SELECT
        VIEW_NAME AS TABLE_NAME
    FROM USER_VIEWS
    UNION ALL
    SELECT
        MVIEW_NAME AS TABLE_NAME
    FROM USER_MVIEWS
    ORDER BY TABLE_NAME
"#};

/// Tables, views and materialized views of one schema. Params: `(schema)`.
pub const SCHEMA_TABLES_SQL: &str = indoc! {r#"
    SELECT
        OBJECT_NAME AS TABLE_NAME
    FROM ALL_OBJECTS
    WHERE
        OBJECT_TYPE IN ('TABLE', 'VIEW', 'MATERIALIZED VIEW')
        AND OWNER = ?
    ORDER BY OBJECT_NAME
"#};
