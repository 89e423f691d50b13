/*!
# Salesboard

A small internal dashboard that turns a spreadsheet's sales data into
date-range reports: a text summary, a chart, a PDF, and optionally an email.

## Overview

One request drives the whole pipeline synchronously: the configured
spreadsheet source is ingested, a snapshot is persisted, the requested date
range is aggregated over the heuristically resolved sales column, the result
is rendered as a PDF with an embedded chart, and — on the send-report path —
delivered by email. Nothing is retried and nothing runs in the background; a
failure surfaces once as a flash message on the dashboard.

## Modules

- **config**: immutable process configuration loaded from the environment
- **dataset**: the tabular data model and sales/date column resolvers
- **report**: date-range filtering and aggregation into report text
- **chart**: per-day sales bar charts (plotters)
- **ingest**: CSV ingestion from a URL or local file
- **store**: dataset snapshots (bincode + gzip) and the reports directory
- **pdf**: PDF rendering with the embedded chart (printpdf)
- **mailer**: SMTP delivery with PDF/chart attachments (lettre)
- **auth**: login verification, session tokens, route guard middleware
- **error**: the report error taxonomy
- **app**: routing and the per-request report orchestrator

## Routes

- `/login` - login form and credential check
- `/dashboard` - date-range form
- `/generate` - run the report pipeline
- `/send-mail` - run the pipeline and email the result
- `/history` - listing of previously rendered PDFs
- `/download/{filename}` - fetch a rendered report file
- `/logout` - end the session

All routes except `/login` require a valid session cookie.
*/

pub mod app;
pub mod auth;
pub mod chart;
pub mod config;
pub mod dataset;
pub mod error;
pub mod ingest;
pub mod mailer;
pub mod pdf;
pub mod report;
pub mod store;
