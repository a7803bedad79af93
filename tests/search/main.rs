mod space;
mod tpe;
